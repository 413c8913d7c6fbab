//! Optics formulae.

pub mod glass;

pub use glass::*;
