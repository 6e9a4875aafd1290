//! Input/output helpers.
//!
//! - historical CSV ingest + validation (`ingest`)
//! - simulation history export to CSV (`export`)
//! - fitted model JSON export (`params`)

pub mod export;
pub mod ingest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use params::*;
