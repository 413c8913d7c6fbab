//! Mathematical utilities: least squares, sample grids, and summary statistics.

pub mod grid;
pub mod ols;
pub mod stats;

pub use grid::*;
pub use ols::*;
