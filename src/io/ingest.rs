//! CSV ingest and normalization.
//!
//! This module turns the historical CSV exports into clean year-indexed series
//! that are safe to aggregate and fit.
//!
//! Design goals:
//! - **Fixed layout**: file names and column positions are hard-coded
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no aggregation or fitting logic here

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use tracing::{info, warn};

use crate::data::{DeforestationData, HistoricalData, MonthlyTemperature, ProvinceTemperatures};
use crate::domain::{MISSING_TEMPERATURE, Series};
use crate::error::AppError;

/// Province/territory files under `temperature/`, without the `.csv` suffix.
pub const PROVINCES: [&str; 13] = [
    "alberta",
    "british_columbia",
    "manitoba",
    "new_brunswick",
    "newfoundland",
    "northwest",
    "nova_scotia",
    "nunavut",
    "ontario",
    "prince_edward",
    "quebec",
    "saskatchewan",
    "yukon",
];

pub const TEMPERATURE_DIR: &str = "temperature";
pub const EMISSION_FILE: &str = "other_data/emission.csv";
pub const DEFORESTATION_FILE: &str = "other_data/deforestation.csv";

// Temperature export columns.
const COL_PROVINCE: usize = 8;
const COL_MONTH: usize = 9;
const COL_TEMPERATURE: usize = 10;

// Emission / deforestation table columns.
const COL_YEAR: usize = 0;
const COL_EMISSION: usize = 1;
const COL_HYDRO: usize = 5;
const COL_TOTAL: usize = 6;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// What happened while reading one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            rows_read: 0,
            rows_used: 0,
            row_errors: Vec::new(),
        }
    }

    pub fn rows_skipped(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Ingest output: parsed value + per-file report.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub value: T,
    pub report: FileReport,
}

/// Everything read from a data directory.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub data: HistoricalData,
    pub reports: Vec<FileReport>,
}

/// Read the full historical dataset from `data_dir`.
pub fn load_historical(data_dir: &Path) -> Result<LoadedData, AppError> {
    let mut reports = Vec::with_capacity(PROVINCES.len() + 2);

    let mut provinces = Vec::with_capacity(PROVINCES.len());
    for name in PROVINCES {
        let path = data_dir.join(TEMPERATURE_DIR).join(format!("{name}.csv"));
        let Ingested { value, report } = read_temperature_csv(&path)?;
        log_report(&report);
        reports.push(report);
        provinces.push(ProvinceTemperatures {
            name: name.to_string(),
            records: value,
        });
    }

    let emission = read_emission_csv(&data_dir.join(EMISSION_FILE))?;
    log_report(&emission.report);
    reports.push(emission.report);

    let deforestation = read_deforestation_csv(&data_dir.join(DEFORESTATION_FILE))?;
    log_report(&deforestation.report);
    reports.push(deforestation.report);

    Ok(LoadedData {
        data: HistoricalData {
            provinces,
            emission: emission.value,
            deforestation: deforestation.value,
        },
        reports,
    })
}

/// Read one province's monthly temperature export.
///
/// Rows with an empty or sentinel temperature are skipped silently; rows with
/// unparseable fields are skipped and recorded as row errors.
pub fn read_temperature_csv(path: &Path) -> Result<Ingested<Vec<MonthlyTemperature>>, AppError> {
    let mut reader = open_csv(path, true)?;
    let mut report = FileReport::new(path);
    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: one header line, 1-based line numbers.
        let line = idx + 2;
        report.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_temperature_row(&record) {
            Ok(Some(row)) => records.push(row),
            Ok(None) => {} // missing value
            Err(message) => report.row_errors.push(RowError { line, message }),
        }
    }

    report.rows_used = records.len();
    ensure_rows(&report)?;
    Ok(Ingested { value: records, report })
}

/// Read the national emission table (`year, Mt CO2e, ...`).
///
/// Only rows whose first cell is a year are data; titles and notes are skipped.
pub fn read_emission_csv(path: &Path) -> Result<Ingested<Series>, AppError> {
    let mut reader = open_csv(path, false)?;
    let mut report = FileReport::new(path);
    let mut series = Series::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        report.rows_read += 1;

        let Ok(record) = result else {
            report.row_errors.push(RowError {
                line,
                message: "CSV parse error".to_string(),
            });
            continue;
        };
        let Some(year) = data_year(&record) else {
            continue;
        };

        match get_number(&record, COL_EMISSION, "emission") {
            Ok(value) => {
                series.insert(year, value);
            }
            Err(message) => report.row_errors.push(RowError { line, message }),
        }
    }

    report.rows_used = series.len();
    ensure_rows(&report)?;
    Ok(Ingested { value: series, report })
}

/// Read the deforestation table (column 5 = hydro, column 6 = total).
pub fn read_deforestation_csv(path: &Path) -> Result<Ingested<DeforestationData>, AppError> {
    let mut reader = open_csv(path, false)?;
    let mut report = FileReport::new(path);
    let mut data = DeforestationData::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        report.rows_read += 1;

        let Ok(record) = result else {
            report.row_errors.push(RowError {
                line,
                message: "CSV parse error".to_string(),
            });
            continue;
        };
        let Some(year) = data_year(&record) else {
            continue;
        };

        let parsed = get_number(&record, COL_HYDRO, "hydro")
            .and_then(|hydro| get_number(&record, COL_TOTAL, "total").map(|total| (hydro, total)));
        match parsed {
            Ok((hydro, total)) => {
                data.hydro.insert(year, hydro);
                data.total.insert(year, total);
            }
            Err(message) => report.row_errors.push(RowError { line, message }),
        }
    }

    report.rows_used = data.total.len();
    ensure_rows(&report)?;
    Ok(Ingested { value: data, report })
}

fn open_csv(path: &Path, has_headers: bool) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn ensure_rows(report: &FileReport) -> Result<(), AppError> {
    if report.rows_used == 0 {
        return Err(AppError::new(
            3,
            format!("No valid rows in '{}'.", report.path.display()),
        ));
    }
    Ok(())
}

fn log_report(report: &FileReport) {
    info!(
        target: "climsim.ingest",
        file = %report.path.display(),
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        rows_skipped = report.rows_skipped(),
        "csv loaded"
    );
    for err in &report.row_errors {
        warn!(
            target: "climsim.ingest",
            file = %report.path.display(),
            line = err.line,
            "{}",
            err.message
        );
    }
}

fn parse_temperature_row(record: &StringRecord) -> Result<Option<MonthlyTemperature>, String> {
    let raw_temp = record.get(COL_TEMPERATURE).unwrap_or("");
    if raw_temp.is_empty() {
        return Ok(None);
    }
    let temperature = raw_temp
        .parse::<f64>()
        .map_err(|_| format!("Invalid temperature '{raw_temp}'"))?;
    if temperature == MISSING_TEMPERATURE || !temperature.is_finite() {
        return Ok(None);
    }

    let province = record
        .get(COL_PROVINCE)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing province code".to_string())?;
    let stamp = record
        .get(COL_MONTH)
        .ok_or_else(|| "Missing month stamp".to_string())?;
    let (year, month) = parse_month(stamp)?;

    Ok(Some(MonthlyTemperature {
        province: province.to_string(),
        year,
        month,
        temperature,
    }))
}

/// Parse a `YYYY-MM` month stamp.
fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map_err(|_| format!("Invalid month '{s}'. Expected YYYY-MM."))?;
    Ok((date.year(), date.month()))
}

fn data_year(record: &StringRecord) -> Option<i32> {
    let cell = record.get(COL_YEAR)?;
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cell.parse().ok()
}

fn get_number(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value"))?;
    let cleaned = raw.replace(',', "");
    let v = cleaned
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'"))?;
    if v.is_finite() { Ok(v) } else { Err(format!("Non-finite `{name}` value")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_stamp_parses() {
        assert_eq!(parse_month("1995-08").unwrap(), (1995, 8));
        assert!(parse_month("1995-13").is_err());
        assert!(parse_month("August").is_err());
    }

    #[test]
    fn data_year_requires_digits() {
        let row = StringRecord::from(vec!["2005", "730"]);
        assert_eq!(data_year(&row), Some(2005));
        let title = StringRecord::from(vec!["Year", "Total"]);
        assert_eq!(data_year(&title), None);
        let note = StringRecord::from(vec!["", "x"]);
        assert_eq!(data_year(&note), None);
    }

    #[test]
    fn numbers_drop_thousands_separators() {
        let row = StringRecord::from(vec!["2005", "", "", "", "", "1,234", "45,678"]);
        assert_eq!(get_number(&row, COL_HYDRO, "hydro").unwrap(), 1234.0);
        assert_eq!(get_number(&row, COL_TOTAL, "total").unwrap(), 45678.0);
        assert!(get_number(&row, 1, "x").is_err());
    }

    #[test]
    fn sentinel_temperature_is_missing() {
        let mut cells = vec![""; 11];
        cells[8] = "ON";
        cells[9] = "2001-08";
        cells[10] = "-9999.9";
        assert!(parse_temperature_row(&StringRecord::from(cells.clone())).unwrap().is_none());

        cells[10] = "17.5";
        let row = parse_temperature_row(&StringRecord::from(cells)).unwrap().unwrap();
        assert_eq!((row.year, row.month), (2001, 8));
        assert_eq!(row.province, "ON");
    }
}
