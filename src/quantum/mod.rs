//! Atomic physics helpers.
//!
//! - coupling coefficients and Landé g (`angular_momentum`)
//! - unit conversions for transitions (`transitions`)
//! - Rabi flopping scans (`rabi`)

pub mod angular_momentum;
pub mod rabi;
pub mod transitions;

pub use angular_momentum::*;
pub use rabi::*;
pub use transitions::*;
