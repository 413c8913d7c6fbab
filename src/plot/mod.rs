//! Plotting.
//!
//! - terminal plots for quick sanity checks (`ascii`)
//! - SVG figures for reports (`svg`)

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::fit::CurveFit;
use crate::math::linspace;

/// Sample a fitted profile on `n` evenly spaced points over `[x_min, x_max]`.
pub fn sample_fit(fit: &CurveFit, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
    linspace(x_min, x_max, n.max(2))
        .into_iter()
        .map(|x| (x, fit.predict(x)))
        .collect()
}

/// Finite `(min, max)` of `values`, or `None` if empty or degenerate.
pub(crate) fn finite_range<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() && hi > lo { Some((lo, hi)) } else { None }
}

pub(crate) fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
