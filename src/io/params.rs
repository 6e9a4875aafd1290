//! Fitted model JSON export.
//!
//! A write-only snapshot of the calibration: parameters, fit quality and the
//! settings that produced them. Nothing reads it back.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::Calibration;
use crate::domain::{CorrelationFit, CurveFit, FittedModel, Season};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct ModelFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub season: Season,
    pub demo: bool,
    pub model: FittedModel,
    pub emission_fit: CurveFit,
    pub deforestation_fit: CurveFit,
    pub correlation_fit: CorrelationFit,
}

impl ModelFile {
    pub fn from_calibration(calibration: &Calibration, season: Season, demo: bool) -> Self {
        Self {
            tool: "climsim".to_string(),
            generated_at: Utc::now(),
            season,
            demo,
            model: calibration.model,
            emission_fit: calibration.emission.clone(),
            deforestation_fit: calibration.deforestation.clone(),
            correlation_fit: calibration.correlation.clone(),
        }
    }
}

/// Write a fitted model JSON file.
pub fn write_model_json(path: &Path, file: &ModelFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create model JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(4, format!("Failed to write model JSON: {e}")))?;

    Ok(())
}
