//! Export a simulated history to CSV.
//!
//! One row per simulated year, meant to be easy to consume in spreadsheets.

use std::path::Path;

use crate::domain::YearStep;
use crate::error::AppError;

/// Write the stepper history (`year,emission,deforestation,temperature,hydro`).
pub fn write_history_csv(path: &Path, history: &[YearStep]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for step in history {
        writer
            .serialize(step)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
