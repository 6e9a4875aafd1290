//! Historical datasets.
//!
//! - [`HistoricalData`]: everything read from the data directory (or generated)
//! - `aggregate`: medians, the national series and the correlation inputs
//! - `sample`: a seeded synthetic dataset for `--demo` runs

pub mod aggregate;
pub mod sample;

pub use aggregate::*;
pub use sample::*;

use crate::domain::Series;

/// One monthly temperature observation for a province.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTemperature {
    pub province: String,
    pub year: i32,
    pub month: u32,
    pub temperature: f64,
}

/// Monthly observations read from one province file.
#[derive(Debug, Clone)]
pub struct ProvinceTemperatures {
    /// File stem, e.g. `nova_scotia`.
    pub name: String,
    pub records: Vec<MonthlyTemperature>,
}

/// Yearly deforested area split by cause.
#[derive(Debug, Clone, Default)]
pub struct DeforestationData {
    pub total: Series,
    /// Area flooded by hydroelectric reservoirs (part of `total`).
    pub hydro: Series,
}

/// Raw historical inputs before aggregation.
#[derive(Debug, Clone)]
pub struct HistoricalData {
    pub provinces: Vec<ProvinceTemperatures>,
    pub emission: Series,
    pub deforestation: DeforestationData,
}
