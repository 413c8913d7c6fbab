//! Profile fitting entry point.
//!
//! Given:
//! - sample points `x_i` and observed values `y_i`
//! - a profile kind
//! - optionally an explicit starting point `p0`
//!
//! we either run a single Levenberg–Marquardt fit from `p0`, or build a data
//! guess, fan it out over a width grid, fit every start (parallel) and return
//! the best (lowest SSE) candidate.

use log::{debug, warn};
use rayon::prelude::*;

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::fit::guess::initial_guess;
use crate::fit::levmar::{CurveFit, LmOptions, curve_fit};
use crate::fit::start_grid::{StartGrid, start_points};

/// Options that affect how a profile is fitted.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    pub lm: LmOptions,
    /// Width fan-out used when no explicit `p0` is supplied.
    pub starts: StartGrid,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    fit: CurveFit,
}

/// Fit `kind` to `(x, y)`.
///
/// With `p0 = Some(..)` this is a single `curve_fit` call. With `p0 = None` the
/// starting point is estimated from the data (see [`initial_guess`]).
pub fn fit_profile(
    kind: ProfileKind,
    x: &[f64],
    y: &[f64],
    p0: Option<&[f64]>,
    opts: &FitOptions,
) -> Result<CurveFit, Error> {
    if let Some(p0) = p0 {
        return curve_fit(kind, x, y, p0, &opts.lm);
    }

    let base = initial_guess(kind, x, y)?;
    let starts = start_points(kind, &base, &opts.starts)?;
    debug!(
        "{} fit: {} starting points from guess {base:?}",
        kind.display_name(),
        starts.len()
    );

    // Evaluate each start independently (parallel).
    let results: Vec<Result<Candidate, Error>> = starts
        .par_iter()
        .enumerate()
        .map(|(idx, p0)| curve_fit(kind, x, y, p0, &opts.lm).map(|fit| Candidate { idx, fit }))
        .collect();

    let mut first_err = None;
    let mut candidates = Vec::with_capacity(results.len());
    for r in results {
        match r {
            Ok(c) => candidates.push(c),
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }

    let Some(best) = select_best(&candidates) else {
        return Err(first_err.unwrap_or_else(|| {
            Error::no_convergence(format!("No starting point converged for {} fit.", kind.display_name()))
        }));
    };

    if candidates.len() < starts.len() {
        warn!(
            "{} fit: {} of {} starting points failed to converge",
            kind.display_name(),
            starts.len() - candidates.len(),
            starts.len()
        );
    }
    debug!(
        "{} fit: selected start #{} with SSE={:.6e}",
        kind.display_name(),
        best.idx,
        best.fit.sse
    );

    Ok(best.fit.clone())
}

/// Deterministic selection: pick the minimum SSE; break ties by start index.
fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut iter = candidates.iter();
    let mut best = iter.next()?;
    for c in iter {
        if c.fit.sse < best.fit.sse || (c.fit.sse == best.fit.sse && c.idx < best.idx) {
            best = c;
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::fwhm::fwhm;
    use crate::math::linspace;
    use crate::models::evaluate_all;
    use approx::assert_relative_eq;

    #[test]
    fn fits_gaussian_without_initial_guess() {
        let x = linspace(500.0, 800.0, 601);
        let truth = [2500.0, 120.0, 654.3, 6.5];
        let y = evaluate_all(ProfileKind::Gaussian, &x, &truth);

        let fit = fit_profile(ProfileKind::Gaussian, &x, &y, None, &FitOptions::default()).unwrap();
        assert_relative_eq!(fit.params[2], 654.3, epsilon = 1e-6);
        assert_relative_eq!(fwhm(ProfileKind::Gaussian, &fit.params).unwrap(), 6.5 * 2.354_820_045_030_949, epsilon = 1e-5);
    }

    #[test]
    fn fits_sechsq_without_initial_guess() {
        let x = linspace(-3.0, 3.0, 241);
        let truth = [1.0, 0.05, 0.2, 0.35];
        let y = evaluate_all(ProfileKind::Sechsq, &x, &truth);

        let fit = fit_profile(ProfileKind::Sechsq, &x, &y, None, &FitOptions::default()).unwrap();
        for (got, want) in fit.params.iter().zip(truth.iter()) {
            assert_relative_eq!(got, want, epsilon = 1e-6);
        }
    }

    #[test]
    fn explicit_p0_is_single_fit() {
        let x = linspace(0.0, 6.0, 120);
        let truth = [0.8, 0.1, 3.0, 0.5];
        let y = evaluate_all(ProfileKind::Sine, &x, &truth);
        let fit = fit_profile(ProfileKind::Sine, &x, &y, Some(&[0.7, 0.0, 2.95, 0.4]), &FitOptions::default()).unwrap();
        assert_relative_eq!(fit.params[2], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn missing_p0_for_sine_is_error() {
        let x = linspace(0.0, 6.0, 20);
        assert!(fit_profile(ProfileKind::Sine, &x, &x, None, &FitOptions::default()).is_err());
    }

    #[test]
    fn selection_breaks_ties_by_index() {
        let fit = CurveFit {
            kind: ProfileKind::Gaussian,
            params: vec![1.0, 0.0, 0.0, 1.0],
            covariance: None,
            sse: 1.0,
            rmse: 1.0,
            n: 4,
            iterations: 1,
        };
        let candidates = vec![
            Candidate { idx: 3, fit: fit.clone() },
            Candidate { idx: 1, fit: fit.clone() },
            Candidate { idx: 2, fit },
        ];
        assert_eq!(select_best(&candidates).unwrap().idx, 1);
    }
}
