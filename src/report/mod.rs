//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::error::Error;
use crate::fit::CurveFit;

/// One sample with its fitted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub x: f64,
    pub y_obs: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Fitted values and residuals for each sample.
pub fn compute_residuals(x: &[f64], y: &[f64], fit: &CurveFit) -> Result<Vec<Residual>, Error> {
    if x.len() != y.len() {
        return Err(Error::invalid("x and y must have the same length."));
    }
    let mut out = Vec::with_capacity(x.len());
    for (&x, &y_obs) in x.iter().zip(y.iter()) {
        let y_fit = fit.predict(x);
        if !y_fit.is_finite() {
            return Err(Error::no_convergence("Non-finite model prediction during residual computation."));
        }
        out.push(Residual {
            x,
            y_obs,
            y_fit,
            residual: y_obs - y_fit,
        });
    }
    Ok(out)
}

/// The `n` samples the fit misses most (largest `|residual|` first).
pub fn worst_residuals(residuals: &[Residual], n: usize) -> Vec<Residual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.residual
            .abs()
            .partial_cmp(&a.residual.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProfileKind;

    fn constant(level: f64) -> CurveFit {
        CurveFit {
            kind: ProfileKind::Gaussian,
            params: vec![0.0, level, 0.0, 1.0],
            covariance: None,
            sse: 0.0,
            rmse: 0.0,
            n: 3,
            iterations: 0,
        }
    }

    #[test]
    fn residuals_and_worst() {
        let res = compute_residuals(&[1.0, 2.0, 3.0], &[100.0, 105.0, 97.0], &constant(100.0)).unwrap();
        assert_eq!(res[1].residual, 5.0);
        let worst = worst_residuals(&res, 2);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].x, 2.0);
        assert_eq!(worst[1].x, 3.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(compute_residuals(&[1.0], &[], &constant(0.0)).is_err());
    }
}
