//! Closed-form fit functions and their parameter gradients.
//!
//! The fitter relies on two primitive operations:
//! - evaluate `f(t; p)` for a profile kind (for residuals/plots)
//! - fill `∂f/∂p_j` at a point (for the Jacobian)
//!
//! Both are implemented here for each profile kind. The named free functions
//! (`gaussian`, `lorentzian`, ...) are the public scalar evaluators.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::domain::ProfileKind;

/// Gaussian profile `A exp(-(t - t0)² / (2σ²)) + B`.
pub fn gaussian(t: f64, a: f64, b: f64, t0: f64, sigma: f64) -> f64 {
    a * (-(t - t0).powi(2) / (2.0 * sigma * sigma)).exp() + b
}

/// Lorentzian profile `A / (πγ (1 + ((x - x0)/γ)²)) + B`.
///
/// `A` is the area under the peak, so the peak height is `A / (πγ)`.
pub fn lorentzian(x: f64, a: f64, b: f64, x0: f64, gamma: f64) -> f64 {
    let u = (x - x0) / gamma;
    a / (PI * gamma * (1.0 + u * u)) + b
}

/// `sech²` profile `A sech²((t - t0)/τ) + B`.
pub fn sechsq(t: f64, a: f64, b: f64, t0: f64, tau: f64) -> f64 {
    let s = sech((t - t0) / tau);
    a * s * s + b
}

/// Sine `A sin(w t + φ) + B`.
pub fn sine(t: f64, a: f64, b: f64, w: f64, phi: f64) -> f64 {
    a * (w * t + phi).sin() + b
}

/// Exponential decay `A exp(-(t - t0)/τ) + B`.
pub fn exp_decay(t: f64, a: f64, b: f64, tau: f64, t0: f64) -> f64 {
    a * (-(t - t0) / tau).exp() + b
}

/// Damped Rabi flop `A (½ - ½ sin(f t + π/2) exp(-t/τ))`.
///
/// `f` is the angular Rabi frequency and `τ` the decoherence time constant.
pub fn rabi(t: f64, a: f64, f: f64, tau: f64) -> f64 {
    a * (0.5 - 0.5 * (f * t + FRAC_PI_2).sin() * (-t / tau).exp())
}

/// Evaluate a profile at `t`.
///
/// # Panics
/// Panics if `params` is shorter than `kind.param_len()`.
pub fn evaluate(kind: ProfileKind, t: f64, params: &[f64]) -> f64 {
    match kind {
        ProfileKind::Gaussian => gaussian(t, params[0], params[1], params[2], params[3]),
        ProfileKind::Lorentzian => lorentzian(t, params[0], params[1], params[2], params[3]),
        ProfileKind::Sechsq => sechsq(t, params[0], params[1], params[2], params[3]),
        ProfileKind::Sine => sine(t, params[0], params[1], params[2], params[3]),
        ProfileKind::ExpDecay => exp_decay(t, params[0], params[1], params[2], params[3]),
        ProfileKind::Rabi => rabi(t, params[0], params[1], params[2]),
    }
}

/// Evaluate a profile over a slice of points.
pub fn evaluate_all(kind: ProfileKind, ts: &[f64], params: &[f64]) -> Vec<f64> {
    ts.iter().map(|&t| evaluate(kind, t, params)).collect()
}

/// Fill `out[j] = ∂f/∂p_j` at `t`.
///
/// # Panics
/// Panics if `params` or `out` is shorter than `kind.param_len()`.
pub fn fill_gradient(kind: ProfileKind, t: f64, params: &[f64], out: &mut [f64]) {
    match kind {
        ProfileKind::Gaussian => {
            let (a, t0, sigma) = (params[0], params[2], params[3]);
            let d = t - t0;
            let g = (-d * d / (2.0 * sigma * sigma)).exp();
            out[0] = g;
            out[1] = 1.0;
            out[2] = a * g * d / (sigma * sigma);
            out[3] = a * g * d * d / (sigma * sigma * sigma);
        }
        ProfileKind::Lorentzian => {
            // f = Aγ / (π(γ² + d²)) + B with d = x - x0.
            let (a, x0, gamma) = (params[0], params[2], params[3]);
            let d = t - x0;
            let den = gamma * gamma + d * d;
            out[0] = gamma / (PI * den);
            out[1] = 1.0;
            out[2] = 2.0 * a * gamma * d / (PI * den * den);
            out[3] = a * (d * d - gamma * gamma) / (PI * den * den);
        }
        ProfileKind::Sechsq => {
            let (a, t0, tau) = (params[0], params[2], params[3]);
            let u = (t - t0) / tau;
            let s = sech(u);
            let s2 = s * s;
            let th = u.tanh();
            out[0] = s2;
            out[1] = 1.0;
            out[2] = 2.0 * a * s2 * th / tau;
            out[3] = 2.0 * a * s2 * th * u / tau;
        }
        ProfileKind::Sine => {
            let (a, w, phi) = (params[0], params[2], params[3]);
            let arg = w * t + phi;
            let c = arg.cos();
            out[0] = arg.sin();
            out[1] = 1.0;
            out[2] = a * t * c;
            out[3] = a * c;
        }
        ProfileKind::ExpDecay => {
            let (a, tau, t0) = (params[0], params[2], params[3]);
            let e = (-(t - t0) / tau).exp();
            out[0] = e;
            out[1] = 1.0;
            out[2] = a * e * (t - t0) / (tau * tau);
            out[3] = a * e / tau;
        }
        ProfileKind::Rabi => {
            // sin(f t + π/2) = cos(f t).
            let (a, f, tau) = (params[0], params[1], params[2]);
            let e = (-t / tau).exp();
            let c = (f * t).cos();
            out[0] = 0.5 - 0.5 * c * e;
            out[1] = 0.5 * a * t * (f * t).sin() * e;
            out[2] = -0.5 * a * c * e * t / (tau * tau);
        }
    }
}

fn sech(x: f64) -> f64 {
    // cosh overflows to inf for |x| > ~710, which correctly yields 0.
    1.0 / x.cosh()
}
