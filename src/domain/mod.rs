//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - year series and curve identifiers (`Series`, `CurveKind`, `CurveShape`)
//! - fitted coefficients and diagnostics (`CurveParams`, `CorrelationParams`, `FitQuality`)
//! - the immutable model handed to the stepper (`FittedModel`)
//! - run configuration and simulation constants (`SimConfig`, `SimConstants`)

pub mod types;

pub use types::*;
