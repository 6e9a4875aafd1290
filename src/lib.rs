//! `climate-sim` library crate.
//!
//! The binary (`climsim`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitter and the year-stepper are usable without any terminal front-end
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod sim;
pub mod tui;
