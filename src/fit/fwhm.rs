//! Full width at half maximum.
//!
//! Two flavours:
//! - [`fwhm`] converts a fitted width parameter (`p[3]`) into a FWHM using the
//!   closed form for the profile
//! - [`fwhm_from_samples`] measures it directly on sampled data

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::math::stats;

/// `2 √(2 ln 2)`: FWHM / σ for a Gaussian.
pub const GAUSSIAN_FWHM_FACTOR: f64 = 2.354_820_045_030_949;

/// `2 acosh(√2)`: FWHM / τ for a `sech²` profile.
pub const SECHSQ_FWHM_FACTOR: f64 = 1.762_747_174_039_086;

/// FWHM of a fitted profile from its parameter vector.
///
/// The width parameter may come back negative from a fit (the profiles are
/// even in it), so its magnitude is used.
pub fn fwhm(kind: ProfileKind, params: &[f64]) -> Result<f64, Error> {
    if !kind.is_peak() {
        return Err(Error::invalid(format!(
            "FWHM is only defined for gaussian, sechsq, or lorentzian fits (got {}).",
            kind.display_name()
        )));
    }
    let width = params.get(3).copied().ok_or_else(|| {
        Error::invalid(format!(
            "{} parameters must have length 4, got {}.",
            kind.display_name(),
            params.len()
        ))
    })?;

    let w = width.abs();
    Ok(match kind {
        ProfileKind::Gaussian => GAUSSIAN_FWHM_FACTOR * w,
        ProfileKind::Sechsq => SECHSQ_FWHM_FACTOR * w,
        // γ is the half width at half maximum.
        _ => 2.0 * w,
    })
}

/// Measure the FWHM of sampled data.
///
/// Finds the global maximum, then walks outwards on each side to the first
/// sample below half of it and linearly interpolates the crossing. `x` must be
/// sorted ascending; the signal is taken as-is (remove any baseline first).
pub fn fwhm_from_samples(x: &[f64], y: &[f64]) -> Result<f64, Error> {
    if x.len() != y.len() {
        return Err(Error::invalid(format!(
            "x has {} values but y has {}.",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 3 {
        return Err(Error::invalid("Need at least 3 samples to measure a FWHM."));
    }
    if x.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(Error::invalid("x must be strictly increasing to measure a FWHM."));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid("y must be finite to measure a FWHM."));
    }

    let (Some(peak), Some(y_max)) = (stats::argmax(y), stats::max(y)) else {
        return Err(Error::invalid("Cannot measure a FWHM of empty data."));
    };
    if !(y_max > 0.0) {
        return Err(Error::invalid("Peak maximum must be positive to measure a FWHM."));
    }
    let half = y_max / 2.0;

    let left = (0..peak)
        .rev()
        .find(|&i| y[i] < half)
        .map(|i| interpolate_crossing(x[i], y[i], x[i + 1], y[i + 1], half))
        .ok_or_else(|| Error::invalid("Peak does not fall below half maximum on the left."))?;
    let right = (peak + 1..y.len())
        .find(|&i| y[i] < half)
        .map(|i| interpolate_crossing(x[i - 1], y[i - 1], x[i], y[i], half))
        .ok_or_else(|| Error::invalid("Peak does not fall below half maximum on the right."))?;

    Ok(right - left)
}

fn interpolate_crossing(x0: f64, y0: f64, x1: f64, y1: f64, level: f64) -> f64 {
    if y1 == y0 {
        return x0;
    }
    x0 + (level - y0) * (x1 - x0) / (y1 - y0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linspace;
    use crate::models::evaluate_all;
    use approx::assert_relative_eq;

    #[test]
    fn closed_form_widths() {
        assert_relative_eq!(
            fwhm(ProfileKind::Gaussian, &[1.0, 0.0, 0.0, 2.0]).unwrap(),
            2.0 * (2.0 * 2.0_f64.ln()).sqrt() * 2.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(fwhm(ProfileKind::Lorentzian, &[1.0, 0.0, 0.0, 0.5]).unwrap(), 1.0);
        assert_relative_eq!(
            fwhm(ProfileKind::Sechsq, &[1.0, 0.0, 0.0, 1.0]).unwrap(),
            2.0 * 2.0_f64.sqrt().acosh(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn negative_width_parameter_is_folded() {
        let a = fwhm(ProfileKind::Gaussian, &[1.0, 0.0, 0.0, -3.0]).unwrap();
        let b = fwhm(ProfileKind::Gaussian, &[1.0, 0.0, 0.0, 3.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_peak_profiles_are_rejected() {
        let err = fwhm(ProfileKind::Sine, &[1.0, 0.0, 1.0, 0.0]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        assert!(fwhm(ProfileKind::Gaussian, &[1.0, 0.0]).is_err());
    }

    #[test]
    fn closed_form_matches_profile_shape() {
        // Evaluating each profile at ±FWHM/2 must give half the peak height.
        for kind in ProfileKind::PEAKS {
            let p = [2.0, 0.0, 0.0, 0.7];
            let half_width = fwhm(kind, &p).unwrap() / 2.0;
            let peak = crate::models::evaluate(kind, 0.0, &p);
            let edge = crate::models::evaluate(kind, half_width, &p);
            assert_relative_eq!(edge, peak / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn sampled_gaussian_width() {
        let x = linspace(-10.0, 10.0, 2001);
        let sigma = 1.3;
        let y = evaluate_all(ProfileKind::Gaussian, &x, &[5.0, 0.0, 0.4, sigma]);
        let w = fwhm_from_samples(&x, &y).unwrap();
        assert_relative_eq!(w, GAUSSIAN_FWHM_FACTOR * sigma, epsilon = 1e-4);
    }

    #[test]
    fn sampled_peak_cut_off_at_edge_is_error() {
        let x = linspace(0.0, 1.0, 50);
        let y = evaluate_all(ProfileKind::Gaussian, &x, &[1.0, 0.0, 0.0, 1.0]);
        assert!(fwhm_from_samples(&x, &y).is_err());
    }

    #[test]
    fn sampled_rejects_unsorted_x() {
        assert!(fwhm_from_samples(&[0.0, 2.0, 1.0], &[0.0, 1.0, 0.0]).is_err());
    }
}
