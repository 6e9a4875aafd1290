//! Error types.
//!
//! Two layers:
//!
//! - [`ModelError`]: failures raised by the fitting/prediction core
//! - [`AppError`]: what the binary reports (message + process exit code)
//!
//! Exit codes: 2 = input/usage/data errors, 3 = insufficient data,
//! 4 = runtime failures (fitting, prediction, terminal or export I/O).

use thiserror::Error;

use crate::domain::CurveKind;

/// Failures of the fitting/prediction core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Curve fitting could not produce a valid parameter set.
    #[error("failed to fit {curve} curve: {cause}")]
    FitFailure { curve: CurveKind, cause: String },

    /// A fitted curve was evaluated outside its domain (`x - b` invalid).
    #[error("{curve} curve is undefined at x={x} (shift b={b})")]
    DomainViolation { curve: CurveKind, x: f64, b: f64 },

    /// Simulation constants that cannot drive a stepper (e.g. negative noise).
    #[error("invalid simulation constants: {0}")]
    InvalidConstants(String),
}

impl ModelError {
    pub fn fit_failure(curve: CurveKind, cause: impl Into<String>) -> Self {
        ModelError::FitFailure {
            curve,
            cause: cause.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
