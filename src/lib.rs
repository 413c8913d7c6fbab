//! `mvdlib` library crate.
//!
//! Helpers for a spectroscopy/atomic physics lab: closed-form fit functions
//! and a Levenberg–Marquardt fitter, FWHM extraction, an Ocean Optics
//! spectrometer file reader, Sellmeier glass optics, angular momentum algebra
//! and transition unit conversions.
//!
//! The binary (`mvd`) is a thin wrapper around this library so the core logic
//! is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod misc;
pub mod models;
pub mod optics;
pub mod plot;
pub mod quantum;
pub mod report;

pub use error::{Error, ErrorKind};
pub use io::oceanoptics;
