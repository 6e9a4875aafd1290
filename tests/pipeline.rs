use std::fs;
use std::io::Write;
use std::path::Path;

use climate_sim::app::pipeline::{calibrate, calibrate_history};
use climate_sim::data::{HistoricalData, demo_dataset};
use climate_sim::domain::{Season, SimConfig};
use climate_sim::io::{DEFORESTATION_FILE, EMISSION_FILE, PROVINCES, TEMPERATURE_DIR, load_historical};
use climate_sim::sim::YearStepper;

/// Lay the dataset out the way the real exports are shaped.
fn write_dataset(dir: &Path, data: &HistoricalData) {
    fs::create_dir_all(dir.join(TEMPERATURE_DIR)).unwrap();
    fs::create_dir_all(dir.join("other_data")).unwrap();

    for province in &data.provinces {
        let path = dir.join(TEMPERATURE_DIR).join(format!("{}.csv", province.name));
        let mut f = fs::File::create(path).unwrap();
        writeln!(f, "x,y,id,station,a,b,c,d,prov,month,temp").unwrap();
        for r in &province.records {
            writeln!(
                f,
                "0,0,1,STN,,,,,{},{}-{:02},{}",
                r.province, r.year, r.month, r.temperature
            )
            .unwrap();
        }
        // Missing values and junk must be skipped.
        writeln!(f, "0,0,1,STN,,,,,XX,2001-08,").unwrap();
        writeln!(f, "0,0,1,STN,,,,,XX,2001-08,-9999.9").unwrap();
        writeln!(f, "0,0,1,STN,,,,,XX,not-a-month,3.5").unwrap();
    }

    let mut f = fs::File::create(dir.join(EMISSION_FILE)).unwrap();
    writeln!(f, "Greenhouse gas emissions,Mt CO2 eq").unwrap();
    writeln!(f, "Year,Total").unwrap();
    for (year, v) in &data.emission {
        writeln!(f, "{year},{v}").unwrap();
    }
    writeln!(f, "Note: national inventory report").unwrap();

    let mut f = fs::File::create(dir.join(DEFORESTATION_FILE)).unwrap();
    writeln!(f, "Year,Agriculture,Mining,Urban,Roads,Hydro,Total").unwrap();
    for (year, total) in &data.deforestation.total {
        let hydro = data.deforestation.hydro[year];
        writeln!(f, "{year},0,0,0,0,\"{hydro}\",\"{total}\"").unwrap();
    }
}

#[test]
fn csv_round_trip_matches_in_memory_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let data = demo_dataset(99).unwrap();
    write_dataset(dir.path(), &data);

    let loaded = load_historical(dir.path()).unwrap();
    assert_eq!(loaded.reports.len(), PROVINCES.len() + 2);
    assert_eq!(loaded.data.emission, data.emission);
    assert_eq!(loaded.data.deforestation.total, data.deforestation.total);
    assert_eq!(loaded.data.deforestation.hydro, data.deforestation.hydro);

    let first = &loaded.reports[0];
    assert_eq!(first.rows_read, data.provinces[0].records.len() + 3);
    assert_eq!(first.rows_used, data.provinces[0].records.len());
    assert_eq!(first.rows_skipped(), 3);
    assert_eq!(first.row_errors.len(), 1);

    let config = SimConfig {
        data_dir: dir.path().to_path_buf(),
        ..SimConfig::default()
    };
    let from_csv = calibrate(&config).unwrap();
    let in_memory = calibrate_history(&data, &config).unwrap();
    assert_eq!(from_csv.model, in_memory.model);
}

#[test]
fn missing_province_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = demo_dataset(5).unwrap();
    write_dataset(dir.path(), &data);
    fs::remove_file(dir.path().join(TEMPERATURE_DIR).join("yukon.csv")).unwrap();

    let err = load_historical(dir.path()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("yukon"));
}

#[test]
fn demo_pipeline_runs_end_to_end() {
    for season in [Season::LateSummer, Season::JulyJanuary] {
        let config = SimConfig {
            demo: true,
            seed: Some(3),
            season,
            ..SimConfig::default()
        };
        let calibration = calibrate(&config).unwrap();

        let mut stepper = YearStepper::from_seed(calibration.model, config.constants.clone(), config.seed).unwrap();
        for _ in 0..25 {
            stepper.advance_year().unwrap();
        }
        let history = stepper.history();
        assert_eq!(history.len(), 26);
        assert!(history.iter().all(|s| s.temperature.is_finite()));
    }
}
