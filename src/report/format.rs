//! Formatted terminal output.
//!
//! Formatting stays in one place so the fitting code stays clean and output
//! changes are localized.

use crate::fit::CurveFit;
use crate::io::{Combined, OceanOpticsSpectrum, SpectrumMetadata};
use crate::optics::Glass;
use crate::report::Residual;

/// Header metadata plus a one-line data summary.
pub fn format_spectrum_info(spectrum: &OceanOpticsSpectrum) -> String {
    let mut out = String::new();

    out.push_str("=== mvd - Ocean Optics spectrum ===\n");
    if let Some(path) = &spectrum.source {
        out.push_str(&format!("Source: {}\n", path.display()));
    }
    out.push_str(&format_metadata(&spectrum.metadata));

    let first = spectrum.wavelength.first().copied().unwrap_or(f64::NAN);
    let last = spectrum.wavelength.last().copied().unwrap_or(f64::NAN);
    out.push_str(&format!(
        "Samples: n={} | λ=[{first:.2}, {last:.2}] nm\n",
        spectrum.len()
    ));
    if let Some((wl, value)) = spectrum.peak() {
        out.push_str(&format!("Peak: {value:.3} at {wl:.3} nm\n"));
    }
    if let Ok(w) = spectrum.measured_fwhm() {
        out.push_str(&format!("FWHM (sampled): {w:.4} nm\n"));
    }

    out
}

/// Known metadata fields, one per line; unknown header entries last.
pub fn format_metadata(meta: &SpectrumMetadata) -> String {
    let mut out = String::new();

    if let Some(ts) = meta.timestamp {
        let tz = meta.timezone.as_deref().map(|z| format!(" {z}")).unwrap_or_default();
        out.push_str(&format!("Date: {}{tz}\n", ts.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(user) = &meta.user {
        out.push_str(&format!("User: {user}\n"));
    }
    if let Some(serial) = &meta.serial_number {
        out.push_str(&format!("Spectrometer: {serial}\n"));
    }
    if let Some(t) = meta.integration_time {
        out.push_str(&format!("Integration time: {:.3} ms\n", t.as_secs_f64() * 1e3));
    }
    if let Some(n) = meta.spectra_averaged {
        out.push_str(&format!("Spectra averaged: {n}\n"));
    }
    if let Some(n) = meta.boxcar_width {
        out.push_str(&format!("Boxcar width: {n}\n"));
    }
    if let Some(b) = meta.electrical_dark_correction {
        out.push_str(&format!("Electrical dark correction: {}\n", yes_no(b)));
    }
    if let Some(b) = meta.nonlinearity_correction {
        out.push_str(&format!("Nonlinearity correction: {}\n", yes_no(b)));
    }
    if let Some(n) = meta.pixel_count {
        out.push_str(&format!("Pixels: {n}\n"));
    }
    if !meta.calibration_coefficients.is_empty() {
        let parts: Vec<String> = meta.calibration_coefficients.iter().map(|c| format!("{c:e}")).collect();
        out.push_str(&format!("Calibration: [{}]\n", parts.join(", ")));
    }
    for (key, value) in &meta.extra {
        if !value.is_empty() {
            out.push_str(&format!("{key}: {}\n", truncate(value, 60)));
        }
    }

    out
}

/// Parameter table with 1σ errors, FWHM and fit diagnostics.
pub fn format_fit_summary(fit: &CurveFit, fwhm: Option<f64>, measured_fwhm: Option<f64>) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== mvd - {} fit ===\n", fit.kind.display_name()));
    let errors = fit.param_errors();
    for (i, (name, value)) in fit.kind.param_names().iter().zip(fit.params.iter()).enumerate() {
        match errors.as_ref().and_then(|e| e.get(i)) {
            Some(err) => out.push_str(&format!("  {name:<6} = {value:>14.6} ± {err:.6}\n")),
            None => out.push_str(&format!("  {name:<6} = {value:>14.6}\n")),
        }
    }
    if let Some(w) = fwhm {
        out.push_str(&format!("FWHM (fit): {w:.6}\n"));
    }
    if let Some(w) = measured_fwhm {
        out.push_str(&format!("FWHM (sampled): {w:.6}\n"));
    }
    out.push_str(&format!(
        "SSE={:.6e} RMSE={:.6e} n={} iterations={}\n",
        fit.sse, fit.rmse, fit.n, fit.iterations
    ));

    out
}

/// Table of the samples the fit misses most.
pub fn format_worst_residuals(residuals: &[Residual]) -> String {
    if residuals.is_empty() {
        return String::new();
    }
    let mut out = String::from("Worst residuals:\n");
    out.push_str(&format!("  {:>12} {:>14} {:>14} {:>14}\n", "x", "observed", "fit", "residual"));
    for r in residuals {
        out.push_str(&format!(
            "  {:>12.4} {:>14.4} {:>14.4} {:>+14.4}\n",
            r.x, r.y_obs, r.y_fit, r.residual
        ));
    }
    out
}

pub fn format_combined(combined: &Combined) -> String {
    let mut out = format!(
        "Combined {} files ({} points) from {}\n",
        combined.indices.len(),
        combined.x.len(),
        combined.dir.display()
    );
    let worst = combined.yerr.iter().copied().fold(0.0_f64, f64::max);
    out.push_str(&format!("Largest standard deviation: {worst:.6}\n"));
    out
}

pub fn format_glass(glass: &Glass, wavelength_nm: f64, index: f64, dispersion: f64, focal: Option<f64>) -> String {
    let mut out = format!("{} at {wavelength_nm} nm\n", glass.name());
    out.push_str(&format!("  n      = {index:.6}\n"));
    out.push_str(&format!("  dn/dλ  = {:.6} 1/µm\n", dispersion * 1e-6));
    if let Some(f) = focal {
        out.push_str(&format!("  f      = {:.4} mm\n", f * 1e3));
    }
    out
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProfileKind;
    use nalgebra::DMatrix;

    #[test]
    fn fit_summary_lists_parameters_with_errors() {
        let fit = CurveFit {
            kind: ProfileKind::Gaussian,
            params: vec![100.0, 2.0, 650.0, 3.0],
            covariance: Some(DMatrix::from_diagonal_element(4, 4, 0.25)),
            sse: 1.0,
            rmse: 0.1,
            n: 100,
            iterations: 7,
        };
        let txt = format_fit_summary(&fit, Some(7.06), None);
        assert!(txt.starts_with("=== mvd - Gaussian fit ===\n"));
        assert!(txt.contains("  sigma  =       3.000000 ± 0.500000\n"), "{txt}");
        assert!(txt.contains("FWHM (fit): 7.060000\n"));
        assert!(!txt.contains("sampled"));
        assert!(txt.contains("n=100 iterations=7"));
    }

    #[test]
    fn metadata_skips_missing_fields() {
        let mut meta = SpectrumMetadata {
            spectra_averaged: Some(3),
            electrical_dark_correction: Some(false),
            ..SpectrumMetadata::default()
        };
        meta.extra.insert("Graph Title".to_string(), String::new());
        meta.extra.insert("Strobe/Lamp Enabled".to_string(), "No".to_string());
        let txt = format_metadata(&meta);
        assert_eq!(
            txt,
            "Spectra averaged: 3\nElectrical dark correction: no\nStrobe/Lamp Enabled: No\n"
        );
    }

    #[test]
    fn worst_residuals_table() {
        let rows = [Residual {
            x: 675.0,
            y_obs: 220.0,
            y_fit: 21.5,
            residual: 198.5,
        }];
        let txt = format_worst_residuals(&rows);
        assert_eq!(
            txt,
            "Worst residuals:\n             x       observed            fit       residual\n      675.0000       220.0000        21.5000      +198.5000\n"
        );
        assert_eq!(format_worst_residuals(&[]), "");
    }

    #[test]
    fn truncate_long_values() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
