//! Aggregation of raw historical records into fit-ready series.
//!
//! - provincial yearly medians over the selected months
//! - the national series (mean of provincial medians)
//! - year-over-year temperature change and its alignment with the drivers

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::data::{DeforestationData, HistoricalData, MonthlyTemperature};
use crate::domain::{CORRELATION_YEARS, NATIONAL_YEARS, Season, Series};
use crate::error::AppError;

/// Aligned inputs for the temperature-response fit: `temps_delta[k]` pairs with
/// the drivers of `years[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationInputs {
    pub years: Vec<i32>,
    pub temps_delta: Vec<f64>,
    pub emissions: Vec<f64>,
    pub deforestations: Vec<f64>,
}

/// Median of a non-empty slice (mean of the two middle values for even lengths).
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Yearly median over the records falling in `months`.
pub fn yearly_median(records: &[MonthlyTemperature], months: &[u32]) -> Series {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for r in records.iter().filter(|r| months.contains(&r.month)) {
        by_year.entry(r.year).or_default().push(r.temperature);
    }
    by_year
        .into_iter()
        .filter_map(|(year, mut values)| median(&mut values).map(|m| (year, m)))
        .collect()
}

/// Yearly temperature for one province under the chosen season.
pub fn seasonal_series(records: &[MonthlyTemperature], season: Season) -> Series {
    match season {
        Season::LateSummer => yearly_median(records, &[8, 9]),
        Season::JulyJanuary => {
            let july = yearly_median(records, &[7]);
            let january = yearly_median(records, &[1]);
            july.into_iter()
                .filter_map(|(year, summer)| january.get(&year).map(|winter| (year, (summer + winter) / 2.0)))
                .collect()
        }
    }
}

/// Mean over provinces for each year in `years`; a year missing from any
/// province is left out.
pub fn national_mean<S: AsRef<str>>(provinces: &[(S, Series)], years: (i32, i32)) -> Series {
    let mut national = Series::new();
    if provinces.is_empty() {
        return national;
    }

    for year in years.0..=years.1 {
        let missing: Vec<&str> = provinces
            .iter()
            .filter(|(_, s)| !s.contains_key(&year))
            .map(|(name, _)| name.as_ref())
            .collect();
        if !missing.is_empty() {
            warn!(
                target: "climsim.aggregate",
                year,
                provinces = %missing.join(","),
                "year skipped: missing provincial temperature"
            );
            continue;
        }
        let sum: f64 = provinces.iter().filter_map(|(_, s)| s.get(&year)).sum();
        national.insert(year, sum / provinces.len() as f64);
    }
    national
}

/// Yearly temperature of every province under the chosen season, in input order.
pub fn provincial_temperatures(data: &HistoricalData, season: Season) -> Vec<(String, Series)> {
    data.provinces
        .iter()
        .map(|p| (p.name.clone(), seasonal_series(&p.records, season)))
        .collect()
}

/// National yearly temperature over the national window.
pub fn national_temperature(provincial: &[(String, Series)]) -> Series {
    let national = national_mean(provincial, NATIONAL_YEARS);
    debug!(
        target: "climsim.aggregate",
        years = national.len(),
        provinces = provincial.len(),
        "national series built"
    );
    national
}

/// `Δ[k] = T[k+1] − T[k]` for every `k` whose successor is present.
pub fn temperature_deltas(national: &Series) -> Series {
    national
        .iter()
        .filter_map(|(&year, &t)| national.get(&(year + 1)).map(|next| (year, next - t)))
        .collect()
}

/// Deforestation not caused by hydro development (`total − hydro`).
pub fn non_hydro(deforestation: &DeforestationData) -> Series {
    deforestation
        .total
        .iter()
        .map(|(&year, &total)| (year, total - deforestation.hydro.get(&year).copied().unwrap_or(0.0)))
        .collect()
}

/// Align Δtemperature, emission and total deforestation over the correlation window.
///
/// Every year of the window must be present in all three series.
pub fn correlation_inputs(
    deltas: &Series,
    emission: &Series,
    deforestation_total: &Series,
) -> Result<CorrelationInputs, AppError> {
    let (first, last) = CORRELATION_YEARS;
    let mut out = CorrelationInputs {
        years: Vec::new(),
        temps_delta: Vec::new(),
        emissions: Vec::new(),
        deforestations: Vec::new(),
    };

    for year in first..=last {
        let lookup = |series: &Series, name: &str| {
            series
                .get(&year)
                .copied()
                .ok_or_else(|| AppError::new(2, format!("Missing {name} value for year {year}.")))
        };
        let dt = lookup(deltas, "temperature change")?;
        let em = lookup(emission, "emission")?;
        let df = lookup(deforestation_total, "deforestation")?;

        out.years.push(year);
        out.temps_delta.push(dt);
        out.emissions.push(em);
        out.deforestations.push(df);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, month: u32, temperature: f64) -> MonthlyTemperature {
        MonthlyTemperature {
            province: "XX".to_string(),
            year,
            month,
            temperature,
        }
    }

    #[test]
    fn median_handles_odd_and_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn late_summer_uses_august_and_september() {
        let records = vec![rec(2000, 8, 10.0), rec(2000, 9, 14.0), rec(2000, 7, 100.0), rec(2001, 8, 5.0)];
        let s = seasonal_series(&records, Season::LateSummer);
        assert_eq!(s.get(&2000), Some(&12.0));
        assert_eq!(s.get(&2001), Some(&5.0));
    }

    #[test]
    fn july_january_averages_both_medians() {
        let records = vec![rec(2000, 7, 20.0), rec(2000, 1, -10.0), rec(2001, 7, 22.0)];
        let s = seasonal_series(&records, Season::JulyJanuary);
        assert_eq!(s.get(&2000), Some(&5.0));
        // No January value: the year is dropped.
        assert!(!s.contains_key(&2001));
    }

    #[test]
    fn national_mean_skips_incomplete_years() {
        let a: Series = [(1991, 1.0), (1992, 2.0)].into_iter().collect();
        let b: Series = [(1991, 3.0)].into_iter().collect();
        let national = national_mean(&[("a", a), ("b", b)], (1991, 1992));
        assert_eq!(national.get(&1991), Some(&2.0));
        assert!(!national.contains_key(&1992));
    }

    #[test]
    fn provincial_series_feed_national_mean() {
        let province = |name: &str, records| crate::data::ProvinceTemperatures {
            name: name.to_string(),
            records,
        };
        let data = HistoricalData {
            provinces: vec![
                province("yukon", vec![rec(1991, 8, 8.0), rec(1991, 9, 6.0), rec(1992, 8, 9.0)]),
                province("ontario", vec![rec(1991, 8, 20.0), rec(1991, 9, 18.0)]),
            ],
            emission: Series::new(),
            deforestation: DeforestationData::default(),
        };

        let provincial = provincial_temperatures(&data, Season::LateSummer);
        assert_eq!(provincial[0].0, "yukon");
        assert_eq!(provincial[0].1.get(&1992), Some(&9.0));
        assert_eq!(provincial[1].1.get(&1991), Some(&19.0));

        let national = national_temperature(&provincial);
        assert_eq!(national.get(&1991), Some(&13.0));
        assert!(!national.contains_key(&1992));
    }

    #[test]
    fn deltas_pair_year_with_successor() {
        let national: Series = [(1991, 10.0), (1992, 10.5), (1993, 10.25), (1995, 11.0)]
            .into_iter()
            .collect();
        let d = temperature_deltas(&national);
        assert_eq!(d.get(&1991), Some(&0.5));
        assert_eq!(d.get(&1992), Some(&-0.25));
        assert!(!d.contains_key(&1993));
        assert!(!d.contains_key(&1995));
    }

    #[test]
    fn correlation_inputs_align_on_window() {
        let (first, last) = CORRELATION_YEARS;
        let deltas: Series = (first..=last).map(|y| (y, 0.01 * y as f64)).collect();
        let emission: Series = (1990..=2019).map(|y| (y, y as f64)).collect();
        let deforestation: Series = (1990..=2019).map(|y| (y, 2.0 * y as f64)).collect();

        let inputs = correlation_inputs(&deltas, &emission, &deforestation).unwrap();
        assert_eq!(inputs.years.len(), (last - first + 1) as usize);
        assert_eq!(inputs.years[0], first);
        assert_eq!(inputs.emissions[0], first as f64);
        assert_eq!(inputs.deforestations[0], 2.0 * first as f64);
        assert_eq!(inputs.temps_delta[0], 0.01 * first as f64);
    }

    #[test]
    fn missing_window_year_is_data_error() {
        let (first, last) = CORRELATION_YEARS;
        let deltas: Series = (first..=last).map(|y| (y, 0.0)).collect();
        let mut emission: Series = (first..=last).map(|y| (y, 1.0)).collect();
        emission.remove(&2000);
        let deforestation = emission.clone();

        let err = correlation_inputs(&deltas, &emission, &deforestation).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("2000"));
    }

    #[test]
    fn non_hydro_subtracts_hydro() {
        let data = DeforestationData {
            total: [(2000, 50_000.0), (2001, 40_000.0)].into_iter().collect(),
            hydro: [(2000, 10_000.0)].into_iter().collect(),
        };
        let rest = non_hydro(&data);
        assert_eq!(rest.get(&2000), Some(&40_000.0));
        assert_eq!(rest.get(&2001), Some(&40_000.0));
    }
}
