//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the fit profile selector (`ProfileKind`)
//! - fit diagnostics and the exported fit file (`FitQuality`, `FitFile`)
//! - resolved run settings for the CLI (`FitConfig`)

pub mod types;

pub use types::*;
