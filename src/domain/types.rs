//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for plotting

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which closed-form profile a fit uses.
///
/// Parameter order for each kind matches the corresponding function in
/// [`crate::models`]; the width parameter of the peak profiles is always `p[3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// `A exp(-(t-t0)²/(2σ²)) + B`, params `[A, B, t0, sigma]`.
    Gaussian,
    /// `A / (πγ(1 + ((x-x0)/γ)²)) + B`, params `[A, B, x0, gamma]`.
    Lorentzian,
    /// `A sech²((t-t0)/τ) + B`, params `[A, B, t0, tau]`.
    Sechsq,
    /// `A sin(w t + φ) + B`, params `[A, B, w, phi]`.
    Sine,
    /// `A exp(-(t-t0)/τ) + B`, params `[A, B, tau, t0]`.
    ExpDecay,
    /// `A (½ - ½ sin(f t + π/2) exp(-t/τ))`, params `[A, f, tau]`.
    Rabi,
}

impl ProfileKind {
    pub const PEAKS: [ProfileKind; 3] = [ProfileKind::Gaussian, ProfileKind::Lorentzian, ProfileKind::Sechsq];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ProfileKind::Gaussian => "Gaussian",
            ProfileKind::Lorentzian => "Lorentzian",
            ProfileKind::Sechsq => "sech^2",
            ProfileKind::Sine => "Sine",
            ProfileKind::ExpDecay => "Exponential decay",
            ProfileKind::Rabi => "Rabi flop",
        }
    }

    /// Number of fit parameters.
    pub fn param_len(self) -> usize {
        match self {
            ProfileKind::Rabi => 3,
            _ => 4,
        }
    }

    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ProfileKind::Gaussian => &["A", "B", "t0", "sigma"],
            ProfileKind::Lorentzian => &["A", "B", "x0", "gamma"],
            ProfileKind::Sechsq => &["A", "B", "t0", "tau"],
            ProfileKind::Sine => &["A", "B", "w", "phi"],
            ProfileKind::ExpDecay => &["A", "B", "tau", "t0"],
            ProfileKind::Rabi => &["A", "f", "tau"],
        }
    }

    /// Whether the profile is a single peak with a defined FWHM.
    pub fn is_peak(self) -> bool {
        Self::PEAKS.contains(&self)
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

/// Sampled fitted curve for quick plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A saved fit result (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub source: Option<PathBuf>,
    pub profile: ProfileKind,
    pub param_names: Vec<String>,
    pub params: Vec<f64>,
    /// One-sigma uncertainties (square root of the covariance diagonal).
    pub param_errors: Option<Vec<f64>>,
    pub fwhm: Option<f64>,
    pub quality: FitQuality,
    pub grid: FitGrid,
}

/// Resolved settings for one `mvd fit` run.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: PathBuf,
    pub profile: ProfileKind,
    /// Explicit starting point; `None` estimates one from the data.
    pub p0: Option<Vec<f64>>,
    /// Wavelength window `[min, max]` to crop to before fitting.
    pub window: Option<(f64, f64)>,

    pub start_min_scale: f64,
    pub start_max_scale: f64,
    pub start_steps: usize,
    pub max_iterations: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub svg: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_names_match_param_len() {
        for kind in ProfileKind::value_variants() {
            assert_eq!(kind.param_names().len(), kind.param_len(), "{kind:?}");
        }
    }

    #[test]
    fn profile_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ProfileKind::ExpDecay).unwrap();
        assert_eq!(json, "\"exp-decay\"");
    }
}
