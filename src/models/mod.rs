//! Curve model implementations.
//!
//! Models are implemented as small, pure functions so that fitting/stepping code
//! can stay generic.

pub mod model;

pub use model::*;
