//! Shared calibration logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest (or demo data) -> aggregation -> curve fits -> correlation fit -> `FittedModel`
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::info;

use crate::data::{
    CorrelationInputs, DEMO_SEED, HistoricalData, correlation_inputs, demo_dataset, national_temperature,
    non_hydro, provincial_temperatures, temperature_deltas,
};
use crate::domain::{CorrelationFit, CurveFit, CurveShape, FittedModel, Season, Series, SimConfig};
use crate::error::AppError;
use crate::fit::{fit_correlation, fit_curve};
use crate::io::{FileReport, load_historical};

/// All computed outputs of a single calibration.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub model: FittedModel,
    pub emission: CurveFit,
    pub deforestation: CurveFit,
    pub correlation: CorrelationFit,
    /// Series the curves were fitted to (for plots and reports).
    pub emission_series: Series,
    pub deforestation_rest: Series,
    pub national_temperature: Series,
    /// Yearly seasonal temperature per province, in file order.
    pub provincial_temperature: Vec<(String, Series)>,
    pub inputs: CorrelationInputs,
    /// Per-file ingest reports (empty for demo data).
    pub reports: Vec<FileReport>,
}

/// Load historical data per `config` and fit the model.
pub fn calibrate(config: &SimConfig) -> Result<Calibration, AppError> {
    let (data, reports) = if config.demo {
        let seed = config.seed.unwrap_or(DEMO_SEED);
        info!(target: "climsim.pipeline", seed, "using synthetic demo dataset");
        (demo_dataset(seed)?, Vec::new())
    } else {
        let loaded = load_historical(&config.data_dir)?;
        (loaded.data, loaded.reports)
    };

    let mut calibration = calibrate_history(&data, config)?;
    calibration.reports = reports;
    Ok(calibration)
}

/// Fit the model to already-loaded historical data.
pub fn calibrate_history(data: &HistoricalData, config: &SimConfig) -> Result<Calibration, AppError> {
    ensure_enough_years(&data.emission, "emission")?;
    ensure_enough_years(&data.deforestation.total, "deforestation")?;

    let emission = fit_curve(CurveShape::Logarithmic, &data.emission, &config.fit)?;
    let deforestation_rest = non_hydro(&data.deforestation);
    let deforestation = fit_curve(CurveShape::Hyperbolic, &deforestation_rest, &config.fit)?;

    let provincial = provincial_temperatures(data, config.season);
    let national = national_temperature(&provincial);
    let deltas = temperature_deltas(&national);
    let inputs = correlation_inputs(&deltas, &data.emission, &data.deforestation.total)?;
    let correlation = fit_correlation(&inputs.temps_delta, &inputs.emissions, &inputs.deforestations)?;

    let model = FittedModel {
        emission: emission.params,
        deforestation: deforestation.params,
        correlation: correlation.params,
    };
    info!(
        target: "climsim.pipeline",
        season = season_name(config.season),
        emission_rmse = emission.quality.rmse,
        deforestation_rmse = deforestation.quality.rmse,
        correlation_rmse = correlation.quality.rmse,
        "model calibrated"
    );

    Ok(Calibration {
        model,
        emission,
        deforestation,
        correlation,
        emission_series: data.emission.clone(),
        deforestation_rest,
        national_temperature: national,
        provincial_temperature: provincial,
        inputs,
        reports: Vec::new(),
    })
}

pub fn season_name(season: Season) -> &'static str {
    match season {
        Season::LateSummer => "late-summer",
        Season::JulyJanuary => "july-january",
    }
}

fn ensure_enough_years(series: &Series, name: &str) -> Result<(), AppError> {
    // Three curve parameters plus one.
    if series.len() < 4 {
        return Err(AppError::new(
            3,
            format!("Not enough {name} years to fit a curve (have {}, need at least 4).", series.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_calibration_fits_reasonably() {
        let config = SimConfig {
            demo: true,
            seed: Some(11),
            ..SimConfig::default()
        };
        let cal = calibrate(&config).unwrap();
        assert!(cal.reports.is_empty());
        assert!(cal.emission.quality.rmse < 30.0, "emission rmse {}", cal.emission.quality.rmse);
        assert!(
            cal.deforestation.quality.rmse < 5_000.0,
            "deforestation rmse {}",
            cal.deforestation.quality.rmse
        );
        assert!(cal.model.correlation.a >= 0.0 && cal.model.correlation.c >= 0.0);
        assert_eq!(cal.inputs.years.len(), 27);
        assert_eq!(cal.provincial_temperature.len(), 13);
        assert_eq!(cal.national_temperature.len(), 29);
    }

    #[test]
    fn short_history_is_insufficient() {
        let mut data = demo_dataset(1).unwrap();
        data.emission = data.emission.into_iter().take(3).collect();
        let err = calibrate_history(&data, &SimConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
