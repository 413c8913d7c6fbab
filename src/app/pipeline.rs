//! Shared spectrum fit pipeline:
//! load -> crop to window -> multi-start fit -> FWHM (fit and sampled).
//!
//! Front-ends only format or export what this returns.

use log::warn;

use crate::domain::FitConfig;
use crate::error::Error;
use crate::fit::{CurveFit, FitOptions, LmOptions, StartGrid, fwhm};
use crate::io::OceanOpticsSpectrum;
use crate::report::{Residual, compute_residuals, worst_residuals};

/// Samples listed in the worst-residuals report.
pub const WORST_RESIDUALS: usize = 5;

/// All computed outputs of a single `mvd fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    /// The spectrum actually fitted (cropped to the window, if any).
    pub spectrum: OceanOpticsSpectrum,
    pub fit: CurveFit,
    /// FWHM from the fitted parameters (peak profiles only).
    pub fwhm: Option<f64>,
    /// FWHM measured on the samples; `None` if the peak is not bracketed.
    pub measured_fwhm: Option<f64>,
    /// Samples the fit misses most, largest `|residual|` first.
    pub worst_residuals: Vec<Residual>,
}

pub fn fit_options(config: &FitConfig) -> FitOptions {
    FitOptions {
        lm: LmOptions {
            max_iterations: config.max_iterations,
            ..LmOptions::default()
        },
        starts: StartGrid {
            min_scale: config.start_min_scale,
            max_scale: config.start_max_scale,
            steps: config.start_steps,
        },
    }
}

/// Execute the fit pipeline.
pub fn run_fit(config: &FitConfig) -> Result<FitRun, Error> {
    let spectrum = OceanOpticsSpectrum::load_sample(&config.input)?;
    run_fit_on(config, spectrum)
}

/// Execute the fit pipeline on an already-loaded spectrum.
pub fn run_fit_on(config: &FitConfig, spectrum: OceanOpticsSpectrum) -> Result<FitRun, Error> {
    let spectrum = match config.window {
        Some((lo, hi)) => spectrum.crop(lo, hi)?,
        None => spectrum,
    };

    let fit = spectrum.fit_profile(config.profile, config.p0.as_deref(), &fit_options(config))?;

    let fwhm = if config.profile.is_peak() {
        Some(fwhm(config.profile, &fit.params)?)
    } else {
        None
    };
    let measured_fwhm = if config.profile.is_peak() {
        match spectrum.measured_fwhm() {
            Ok(w) => Some(w),
            Err(e) => {
                warn!("Sampled FWHM unavailable: {}", e.message());
                None
            }
        }
    } else {
        None
    };

    let residuals = compute_residuals(&spectrum.wavelength, &spectrum.intensity, &fit)?;

    Ok(FitRun {
        worst_residuals: worst_residuals(&residuals, WORST_RESIDUALS),
        spectrum,
        fit,
        fwhm,
        measured_fwhm,
    })
}
