//! Linear least squares solver.
//!
//! Every Levenberg–Marquardt step solves a small linear problem of the form:
//!
//! ```text
//! minimize ‖J δ - r‖² + λ ‖D δ‖²
//! ```
//!
//! which we write as an ordinary least squares problem on the stacked matrix
//! `[J; √λ D]` with right-hand side `[r; 0]`.
//!
//! Implementation choices:
//! - We use SVD so tall (more rows than columns) systems solve robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Parameter dimension is tiny (3–4 columns), so SVD cost is negligible next
//!   to model evaluation on a few thousand spectrometer pixels.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Moore–Penrose pseudo-inverse of a symmetric normal matrix (e.g. `JᵀJ`).
///
/// Singular values below `eps · σ_max` are treated as zero, so rank-deficient
/// fits still get a covariance.
pub fn pseudo_inverse(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let svd = m.clone().svd(true, true);
    let s_max = svd.singular_values.iter().copied().fold(0.0, f64::max);
    if !(s_max.is_finite() && s_max > 0.0) {
        return None;
    }
    let eps = f64::EPSILON * m.nrows().max(m.ncols()) as f64 * s_max;
    let inv = svd.pseudo_inverse(eps).ok()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}
