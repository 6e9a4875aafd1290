//! Reporting utilities: formatted terminal output for calibrations and runs.

pub mod format;

pub use format::*;
