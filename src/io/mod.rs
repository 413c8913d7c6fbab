//! Input/output helpers.
//!
//! - Ocean Optics spectrum files (`oceanoptics`)
//! - numeric column files (`columns`)
//! - averaging repeated scans to CSV (`combine`)
//! - fit result JSON (`export`)

pub mod columns;
pub mod combine;
pub mod export;
pub mod oceanoptics;

pub use columns::*;
pub use combine::*;
pub use export::*;
pub use oceanoptics::*;
