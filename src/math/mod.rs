//! Mathematical utilities: shifted basis functions, least squares, and 1-D search.

pub mod basis;
pub mod ols;
pub mod search;

pub use basis::*;
pub use ols::*;
pub use search::*;
