//! Curve fitting.
//!
//! Responsibilities:
//!
//! - generate shift grids for the logarithmic / hyperbolic year curves
//! - fit each year curve by grid search + refinement
//! - fit the non-negative temperature response to emission and deforestation

pub mod correlation;
pub mod fitter;
pub mod shift_grid;

pub use correlation::*;
pub use fitter::*;
pub use shift_grid::*;
