//! Year-by-year simulation driven by a fitted model.

pub mod stepper;

pub use stepper::*;
