//! Terminal plots for headless output.

pub mod ascii;

pub use ascii::*;
