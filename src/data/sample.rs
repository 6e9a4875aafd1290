//! Synthetic historical dataset for `--demo` runs.
//!
//! The series follow the same shapes the model fits (a logarithmic emission
//! curve, a hyperbolic deforestation remainder, a warming trend) with Gaussian
//! noise, so the whole pipeline can run without the CSV exports.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::{DeforestationData, HistoricalData, MonthlyTemperature, ProvinceTemperatures};
use crate::domain::{CurveParams, Series};
use crate::error::AppError;
use crate::io::PROVINCES;

/// Seed used when `--demo` is given without `--seed`.
pub const DEMO_SEED: u64 = 1990;

const FIRST_YEAR: i32 = 1990;
const LAST_YEAR: i32 = 2019;

const EMISSION_CURVE: CurveParams = CurveParams {
    a: 60.0,
    b: 1985.0,
    c: 503.0,
};
const DEFORESTATION_CURVE: CurveParams = CurveParams {
    a: 269_000.0,
    b: 1980.0,
    c: 33_100.0,
};

/// Months emitted per province: enough for both seasons.
const MONTHS: [u32; 4] = [1, 7, 8, 9];

pub fn demo_dataset(seed: u64) -> Result<HistoricalData, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = |sigma: f64| {
        Normal::new(0.0, sigma).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))
    };
    let emission_noise = noise(8.0)?;
    let deforestation_noise = noise(1_500.0)?;
    let temperature_noise = noise(0.6)?;

    let mut emission = Series::new();
    let mut deforestation = DeforestationData::default();
    for year in FIRST_YEAR..=LAST_YEAR {
        let x = year as f64;
        let em = EMISSION_CURVE.a * (x - EMISSION_CURVE.b).ln() + EMISSION_CURVE.c;
        emission.insert(year, em + emission_noise.sample(&mut rng));

        let rest = DEFORESTATION_CURVE.a / (x - DEFORESTATION_CURVE.b) + DEFORESTATION_CURVE.c;
        let rest = (rest + deforestation_noise.sample(&mut rng)).max(0.0);
        let hydro = if rng.gen_ratio(1, 5) {
            rng.gen_range(2_000.0..12_000.0)
        } else {
            0.0
        };
        deforestation.hydro.insert(year, hydro);
        deforestation.total.insert(year, rest + hydro);
    }

    let mut provinces = Vec::with_capacity(PROVINCES.len());
    for (i, name) in PROVINCES.iter().enumerate() {
        // Fixed per-province offset; every province warms ~0.03 °C/yr.
        let offset = 4.0 - 1.5 * i as f64;
        let mut records = Vec::with_capacity(MONTHS.len() * (LAST_YEAR - FIRST_YEAR + 1) as usize);
        for year in FIRST_YEAR..=LAST_YEAR {
            let trend = 0.03 * (year - FIRST_YEAR) as f64;
            for month in MONTHS {
                let seasonal = match month {
                    1 => -15.0,
                    7 => 18.0,
                    8 => 17.0,
                    _ => 12.0,
                };
                records.push(MonthlyTemperature {
                    province: name.to_ascii_uppercase(),
                    year,
                    month,
                    temperature: seasonal + offset + trend + temperature_noise.sample(&mut rng),
                });
            }
        }
        provinces.push(ProvinceTemperatures {
            name: (*name).to_string(),
            records,
        });
    }

    Ok(HistoricalData {
        provinces,
        emission,
        deforestation,
    })
}
