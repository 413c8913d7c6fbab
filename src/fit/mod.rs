//! Curve fitting.
//!
//! Responsibilities:
//!
//! - Levenberg–Marquardt least squares for a single start (`levmar`)
//! - data-driven starting points and width fan-out (`guess`, `start_grid`)
//! - evaluate every start (parallel) and keep the best (`fitter`)
//! - FWHM from fit parameters or from samples (`fwhm`)

pub mod fitter;
pub mod fwhm;
pub mod guess;
pub mod levmar;
pub mod start_grid;

pub use fitter::*;
pub use fwhm::*;
pub use guess::*;
pub use levmar::*;
pub use start_grid::*;
