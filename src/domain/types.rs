//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and stepping
//! - exported to JSON/CSV
//! - printed in terminal reports

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Year-indexed observations, ordered by year.
pub type Series = BTreeMap<i32, f64>;

/// Which modeled quantity a curve describes (used for labels and errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Emission,
    Deforestation,
    Correlation,
}

impl CurveKind {
    pub fn display_name(self) -> &'static str {
        match self {
            CurveKind::Emission => "emission",
            CurveKind::Deforestation => "deforestation",
            CurveKind::Correlation => "correlation",
        }
    }

    /// Number of free coefficients in the fitted function.
    pub fn param_count(self) -> usize {
        match self {
            CurveKind::Emission | CurveKind::Deforestation => 3,
            CurveKind::Correlation => 5,
        }
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fixed shape of a three-coefficient year curve.
///
/// Both shapes are linear in `a` and `c` once the shift `b` is fixed:
///
/// - `Logarithmic`: `y = a·ln(x − b) + c`, defined for `x > b`
/// - `Hyperbolic`:  `y = a / (x − b) + c`, defined for `x ≠ b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveShape {
    Logarithmic,
    Hyperbolic,
}

impl CurveShape {
    /// The quantity each shape models in this simulation.
    pub fn kind(self) -> CurveKind {
        match self {
            CurveShape::Logarithmic => CurveKind::Emission,
            CurveShape::Hyperbolic => CurveKind::Deforestation,
        }
    }

    pub fn formula(self) -> &'static str {
        match self {
            CurveShape::Logarithmic => "y = a*ln(x - b) + c",
            CurveShape::Hyperbolic => "y = a/(x - b) + c",
        }
    }
}

/// Coefficients `(a, b, c)` of a year curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl CurveParams {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }
}

/// Coefficients `(a, b, c, d, e)` of the temperature response
/// `Δt = |a|·(emission − b) + |c|·(deforestation − d) + e`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
}

impl CorrelationParams {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64) -> Self {
        Self { a, b, c, d, e }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

impl FitQuality {
    pub fn from_sse(sse: f64, n: usize) -> Self {
        let rmse = if n > 0 { (sse / n as f64).sqrt() } else { f64::NAN };
        Self { sse, rmse, n }
    }
}

/// Fit output for a single year curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFit {
    pub shape: CurveShape,
    pub params: CurveParams,
    pub quality: FitQuality,
}

/// Fit output for the temperature response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationFit {
    pub params: CorrelationParams,
    pub quality: FitQuality,
}

/// Immutable set of fitted coefficients consumed by the year stepper.
///
/// Computed once from historical data and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub emission: CurveParams,
    pub deforestation: CurveParams,
    pub correlation: CorrelationParams,
}

/// Which months feed the yearly temperature median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    /// Median over August and September.
    LateSummer,
    /// Mean of the July median and the January median.
    JulyJanuary,
}

/// Physical quantity tracked by the simulation (labels and units for output).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Emission,
    Deforestation,
    Temperature,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [Quantity::Emission, Quantity::Deforestation, Quantity::Temperature];

    pub fn label(self) -> &'static str {
        match self {
            Quantity::Emission => "Emission",
            Quantity::Deforestation => "Deforestation",
            Quantity::Temperature => "Temperature",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Emission => "Megatonnes of CO2 Equivalent",
            Quantity::Deforestation => "Hectares",
            Quantity::Temperature => "Degrees Celsius",
        }
    }

    /// Y-axis label for summary plots, e.g. `Deforestation (Hectares)`.
    pub fn axis_label(self) -> String {
        format!("{} ({})", self.label(), self.unit())
    }
}

/// Constants of the year-by-year simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConstants {
    /// First simulated year; all series start here.
    pub base_year: i32,
    /// Temperature (°C) at the base year.
    pub start_temperature: f64,
    /// Half-width of the uniform emission noise (Mt CO2e).
    pub emission_noise: f64,
    /// Half-width of the uniform deforestation noise (hectares).
    pub deforestation_noise: f64,
    /// Hydro event probability per year, as `numerator / denominator`.
    pub hydro_odds: (u32, u32),
    /// Extra deforestation (hectares) added in a hydro year, `[low, high]`.
    pub hydro_extra: (f64, f64),
}

impl Default for SimConstants {
    fn default() -> Self {
        Self {
            base_year: 2020,
            start_temperature: 14.0,
            emission_noise: 30.0,
            deforestation_noise: 3000.0,
            hydro_odds: (1, 20),
            hydro_extra: (20_000.0, 30_000.0),
        }
    }
}

/// Deterministic optimizer settings for the year-curve fitter.
///
/// The shift `b` is scanned at `distance` years outside the data range, with
/// distances log-spaced in `[shift_min, shift_max]`, then refined by
/// golden-section search.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSettings {
    pub shift_min: f64,
    pub shift_max: f64,
    pub shift_steps: usize,
    pub refine_iters: usize,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            shift_min: 1e-3,
            shift_max: 1e4,
            shift_steps: 240,
            refine_iters: 100,
        }
    }
}

/// First and last year (inclusive) of the temperature/driver correlation window.
pub const CORRELATION_YEARS: (i32, i32) = (1991, 2017);

/// Years (inclusive) over which the national temperature series is built.
pub const NATIONAL_YEARS: (i32, i32) = (1991, 2019);

/// Missing-value sentinel used by the temperature exports.
pub const MISSING_TEMPERATURE: f64 = -9999.9;

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus hard-coded defaults).
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub data_dir: PathBuf,
    pub season: Season,
    /// Fit on the seeded synthetic dataset instead of the CSVs.
    pub demo: bool,
    /// Seed for the simulation RNG (`None` = OS entropy).
    pub seed: Option<u64>,
    pub constants: SimConstants,
    pub fit: FitSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            season: Season::LateSummer,
            demo: false,
            seed: None,
            constants: SimConstants::default(),
            fit: FitSettings::default(),
        }
    }
}

/// Result of one simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearStep {
    pub year: i32,
    pub emission: f64,
    pub deforestation: f64,
    pub temperature: f64,
    /// A hydro-development event flooded extra forest this year.
    pub hydro: bool,
}
