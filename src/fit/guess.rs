//! Data-driven starting points.
//!
//! Peak profiles start from the sampled peak: offset at the data minimum,
//! centre at the maximum, width from the sampled FWHM. Exponential decay
//! starts from the first/last samples. Oscillatory models (sine, Rabi) have
//! no reliable guess and need an explicit `p0`.

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::fit::fwhm::{SECHSQ_FWHM_FACTOR, GAUSSIAN_FWHM_FACTOR, fwhm_from_samples};
use crate::math::stats;

/// Fraction of the x span used as a FWHM fallback when the sampled peak does
/// not cross half maximum on both sides.
const FALLBACK_WIDTH_FRACTION: f64 = 0.1;

/// Estimate a starting parameter vector for `kind` from samples.
pub fn initial_guess(kind: ProfileKind, x: &[f64], y: &[f64]) -> Result<Vec<f64>, Error> {
    if x.len() != y.len() || x.is_empty() {
        return Err(Error::invalid(format!(
            "Cannot guess parameters from x[{}] / y[{}].",
            x.len(),
            y.len()
        )));
    }

    match kind {
        ProfileKind::Gaussian | ProfileKind::Lorentzian | ProfileKind::Sechsq => peak_guess(kind, x, y),
        ProfileKind::ExpDecay => {
            let last = y.len() - 1;
            let b = y[last];
            let a = y[0] - b;
            let span = (x[last] - x[0]).abs();
            let tau = if span > 0.0 { span / 3.0 } else { 1.0 };
            Ok(vec![a, b, tau, x[0]])
        }
        ProfileKind::Sine | ProfileKind::Rabi => Err(Error::invalid(format!(
            "{} fits need an explicit initial guess.",
            kind.display_name()
        ))),
    }
}

fn peak_guess(kind: ProfileKind, x: &[f64], y: &[f64]) -> Result<Vec<f64>, Error> {
    let (Some(y_min), Some(y_max), Some(i_max)) = (stats::min(y), stats::max(y), stats::argmax(y)) else {
        return Err(Error::invalid("Cannot guess parameters from empty data."));
    };
    let (Some(x_lo), Some(x_hi)) = (stats::min(x), stats::max(x)) else {
        return Err(Error::invalid("Cannot guess parameters from empty data."));
    };

    let offset = y_min;
    let height = y_max - y_min;
    let center = x[i_max];

    let shifted: Vec<f64> = y.iter().map(|v| v - offset).collect();
    let mut width = fwhm_from_samples(x, &shifted).unwrap_or(0.0);
    if !(width.is_finite() && width > 0.0) {
        width = (x_hi - x_lo) * FALLBACK_WIDTH_FRACTION;
    }
    if !(width > 0.0) {
        width = 1.0;
    }

    Ok(match kind {
        ProfileKind::Gaussian => vec![height, offset, center, width / GAUSSIAN_FWHM_FACTOR],
        ProfileKind::Lorentzian => {
            let gamma = width / 2.0;
            // Peak height of the area-normalised Lorentzian is A/(πγ).
            vec![height * std::f64::consts::PI * gamma, offset, center, gamma]
        }
        _ => vec![height, offset, center, width / SECHSQ_FWHM_FACTOR],
    })
}
