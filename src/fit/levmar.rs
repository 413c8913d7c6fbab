//! Levenberg–Marquardt non-linear least squares.
//!
//! Given:
//! - sample points `x_i`
//! - observed values `y_i`
//! - a profile kind and a starting parameter vector `p0`
//!
//! we iterate damped Gauss–Newton steps:
//! - build the Jacobian `J_ij = ∂f(x_i)/∂p_j` from analytic gradients
//! - solve `[J; √λ D] δ = [r; 0]` for the step (Marquardt diagonal scaling `D`)
//! - accept the step if it lowers SSE (and relax `λ`), otherwise stiffen `λ`
//!
//! Covariance is scaled by the reduced chi-square (relative weights):
//! `cov = (JᵀJ)⁺ · SSE / (n - p)`.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::domain::ProfileKind;
use crate::error::Error;
use crate::math::{pseudo_inverse, solve_least_squares};
use crate::models::{evaluate, fill_gradient};

const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 10.0;
/// Once `λ` exceeds this, no descent step exists at working precision and the
/// current point is a stationary point of the SSE.
const LAMBDA_MAX: f64 = 1e16;
/// Floor for Marquardt scaling so parameters with zero sensitivity still move.
const SCALE_FLOOR: f64 = 1e-12;

/// Iteration controls.
#[derive(Debug, Clone)]
pub struct LmOptions {
    /// Maximum number of accepted-or-rejected steps.
    pub max_iterations: usize,
    /// Relative SSE reduction below which the fit is converged.
    pub ftol: f64,
    /// Relative step size below which the fit is converged.
    pub xtol: f64,
    /// Initial damping.
    pub initial_lambda: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        // MINPACK lmdif default tolerances (√ε).
        Self {
            max_iterations: 1000,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            initial_lambda: 1e-3,
        }
    }
}

/// Result of a converged fit.
#[derive(Debug, Clone)]
pub struct CurveFit {
    pub kind: ProfileKind,
    pub params: Vec<f64>,
    /// Parameter covariance; `None` when `n == p` or `JᵀJ` is degenerate.
    pub covariance: Option<DMatrix<f64>>,
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

impl CurveFit {
    /// One-sigma parameter uncertainties.
    pub fn param_errors(&self) -> Option<Vec<f64>> {
        self.covariance
            .as_ref()
            .map(|c| (0..c.nrows()).map(|i| c[(i, i)].max(0.0).sqrt()).collect())
    }

    /// Evaluate the fitted profile at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        evaluate(self.kind, x, &self.params)
    }
}

/// Fit `kind` to `(x, y)` starting from `p0`.
pub fn curve_fit(
    kind: ProfileKind,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    opts: &LmOptions,
) -> Result<CurveFit, Error> {
    validate_inputs(kind, x, y, p0)?;

    let n = x.len();
    let p = kind.param_len();

    let mut params = p0.to_vec();
    let mut sse = sum_sq_residuals(kind, x, y, &params)
        .ok_or_else(|| Error::invalid("Initial guess produces non-finite residuals."))?;
    let mut lambda = opts.initial_lambda;
    let mut converged = sse == 0.0;
    let mut iterations = 0usize;

    while !converged {
        if iterations >= opts.max_iterations {
            return Err(Error::no_convergence(format!(
                "Optimal parameters not found: {} iterations exceeded ({} fit, SSE={sse:.6e}).",
                opts.max_iterations,
                kind.display_name()
            )));
        }
        iterations += 1;

        let (jac, resid) = jacobian_and_residuals(kind, x, y, &params);
        let scale: Vec<f64> = (0..p)
            .map(|j| jac.column(j).norm().max(SCALE_FLOOR))
            .collect();

        // Inner loop: raise λ until a step lowers the SSE.
        loop {
            let step = damped_step(&jac, &resid, &scale, lambda);
            let trial: Option<(Vec<f64>, f64)> = step.and_then(|delta| {
                let candidate: Vec<f64> = params.iter().zip(delta.iter()).map(|(a, d)| a + d).collect();
                sum_sq_residuals(kind, x, y, &candidate).map(|s| (candidate, s))
            });

            match trial {
                Some((candidate, trial_sse)) if trial_sse < sse => {
                    let step_norm = params
                        .iter()
                        .zip(candidate.iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum::<f64>()
                        .sqrt();
                    let param_norm = candidate.iter().map(|v| v * v).sum::<f64>().sqrt();
                    let rel_drop = (sse - trial_sse) / sse;

                    params = candidate;
                    sse = trial_sse;
                    lambda = (lambda / LAMBDA_DOWN).max(f64::MIN_POSITIVE);

                    if sse == 0.0 || rel_drop <= opts.ftol || step_norm <= opts.xtol * (param_norm + opts.xtol) {
                        converged = true;
                    }
                    break;
                }
                _ => {
                    lambda *= LAMBDA_UP;
                    if lambda > LAMBDA_MAX {
                        converged = true;
                        break;
                    }
                }
            }
        }
    }

    let (jac, _) = jacobian_and_residuals(kind, x, y, &params);
    let covariance = if n > p {
        let jtj = jac.transpose() * &jac;
        pseudo_inverse(&jtj).map(|inv| inv * (sse / (n - p) as f64))
    } else {
        None
    };

    debug!(
        "{} fit converged after {iterations} iterations: SSE={sse:.6e}, params={params:?}",
        kind.display_name()
    );

    Ok(CurveFit {
        kind,
        params,
        covariance,
        sse,
        rmse: (sse / n as f64).sqrt(),
        n,
        iterations,
    })
}

fn validate_inputs(kind: ProfileKind, x: &[f64], y: &[f64], p0: &[f64]) -> Result<(), Error> {
    if x.len() != y.len() {
        return Err(Error::invalid(format!(
            "x has {} values but y has {}.",
            x.len(),
            y.len()
        )));
    }
    if p0.len() != kind.param_len() {
        return Err(Error::invalid(format!(
            "{} fit takes {} parameters, got {}.",
            kind.display_name(),
            kind.param_len(),
            p0.len()
        )));
    }
    if x.len() < kind.param_len() {
        return Err(Error::invalid(format!(
            "Need at least {} points for a {} fit, got {}.",
            kind.param_len(),
            kind.display_name(),
            x.len()
        )));
    }
    if x.iter().chain(y.iter()).chain(p0.iter()).any(|v| !v.is_finite()) {
        return Err(Error::invalid("Fit inputs must be finite."));
    }
    Ok(())
}

fn sum_sq_residuals(kind: ProfileKind, x: &[f64], y: &[f64], params: &[f64]) -> Option<f64> {
    let sse: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let r = yi - evaluate(kind, xi, params);
            r * r
        })
        .sum();
    if sse.is_finite() { Some(sse) } else { None }
}

fn jacobian_and_residuals(
    kind: ProfileKind,
    x: &[f64],
    y: &[f64],
    params: &[f64],
) -> (DMatrix<f64>, DVector<f64>) {
    let n = x.len();
    let p = kind.param_len();
    let mut jac = DMatrix::<f64>::zeros(n, p);
    let mut resid = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for i in 0..n {
        fill_gradient(kind, x[i], params, &mut row);
        for j in 0..p {
            // Non-finite partials (e.g. overflow far in a tail) carry no
            // usable direction information.
            jac[(i, j)] = if row[j].is_finite() { row[j] } else { 0.0 };
        }
        resid[i] = y[i] - evaluate(kind, x[i], params);
    }

    (jac, resid)
}

fn damped_step(jac: &DMatrix<f64>, resid: &DVector<f64>, scale: &[f64], lambda: f64) -> Option<DVector<f64>> {
    let n = jac.nrows();
    let p = jac.ncols();

    let mut a = DMatrix::<f64>::zeros(n + p, p);
    a.view_mut((0, 0), (n, p)).copy_from(jac);
    let sqrt_lambda = lambda.sqrt();
    for j in 0..p {
        a[(n + j, j)] = sqrt_lambda * scale[j];
    }

    let mut b = DVector::<f64>::zeros(n + p);
    b.rows_mut(0, n).copy_from(resid);

    solve_least_squares(&a, &b)
}
