//! Fit function implementations.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic over the profile kind.

pub mod profile;

pub use profile::*;
