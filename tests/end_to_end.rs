//! CSV → fit → model file → prediction, through the public library API.

use std::fs;

use rayleigh_defects::app::pipeline::{run_predict, run_train, run_validate};
use rayleigh_defects::domain::{CalibrationMethod, FitConfig, PredictionRequest};
use rayleigh_defects::error::ErrorKind;
use rayleigh_defects::fit::fit;
use rayleigh_defects::io::{load_historical_records, read_model_json};
use rayleigh_defects::predict::predict;
use rayleigh_defects::validation::HoldoutConfig;
use tempfile::TempDir;

/// Defects per month for a project with discovery peaking around month 4.
fn rayleigh_row(id: &str, size: f64, months: u32) -> String {
    let sigma: f64 = 4.0;
    let total = size * 0.0008;
    let cdf = |t: f64| -(-(t * t) / (2.0 * sigma * sigma)).exp_m1();
    let monthly: Vec<String> = (1..=months)
        .map(|m| {
            let m = m as f64;
            format!("{:.3}", total * (cdf(m) - cdf(m - 1.0)))
        })
        .collect();
    format!("{id},{size},{months},{}", monthly.join(","))
}

fn write_history(dir: &TempDir) -> std::path::PathBuf {
    let mut lines = vec![String::from("id,size,duration_months,m1,m2,m3,m4,m5,m6,m7,m8,m9,m10,m11,m12")];
    lines.push(rayleigh_row("A", 20_000.0, 10));
    lines.push(rayleigh_row("B", 45_000.0, 12));
    lines.push(rayleigh_row("C", 60_000.0, 12));
    lines.push(rayleigh_row("D", 80_000.0, 11));
    lines.push(rayleigh_row("E", 120_000.0, 12));
    lines.push("ZERO,30000,3,0,0,0".to_string());
    lines.push("BAD,-1,2,1,1".to_string());
    let path = dir.path().join("historical.csv");
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

#[test]
fn train_save_load_predict() {
    let dir = TempDir::new().unwrap();
    let data = write_history(&dir);
    let model_path = dir.path().join("models").join("defect_model.json");

    let out = run_train(&data, Some(model_path.as_path()), &FitConfig::default()).unwrap();
    assert_eq!(out.ingest.rows_read, 7);
    assert_eq!(out.ingest.rows_used, 6);
    assert_eq!(out.model.records_used, 5);
    assert_eq!(out.model.records_skipped, 1);
    assert!((out.model.shape_parameter - 4.0).abs() < 0.1, "sigma={}", out.model.shape_parameter);
    assert!(out.model.fit_score > 0.99);
    assert_eq!(out.model.calibration.method, CalibrationMethod::Linear);

    let saved = read_model_json(&model_path).unwrap();
    assert_eq!(saved, out.model);

    let request = PredictionRequest::new(80_000.0, 12).unwrap();
    let (_, result) = run_predict(&model_path, &request).unwrap();
    assert!(result.total_defects_estimated > 0);
    assert_eq!(result.monthly_distribution.len(), 12);
    let expected = saved.calibration.expected_total(80_000.0);
    assert!((result.distribution_sum() - expected).abs() <= 0.05 + 1e-6);
    assert!((expected - result.total_defects_estimated as f64).abs() <= 0.5);
    let peak = result.peak_month().unwrap();
    assert!((3..=5).contains(&peak), "peak={peak}");
}

#[test]
fn single_near_rayleigh_record_fits_well() {
    let csv = "size,duration_months,m1,m2,m3,m4,m5,m6,m7,m8,m9,m10\n\
               50000,10,2,5,8,10,9,6,4,2,1,0.5\n";
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.csv");
    fs::write(&path, csv).unwrap();

    let data = load_historical_records(&path).unwrap();
    let model = fit(&data.records, &FitConfig::default()).unwrap();
    assert!(model.fit_score > 0.8, "fit_score={}", model.fit_score);
    assert_eq!(model.calibration.method, CalibrationMethod::Proportional);

    let result = predict(&model, &PredictionRequest::new(1000.0, 1).unwrap()).unwrap();
    assert_eq!(result.monthly_distribution.len(), 1);
    let expected = model.calibration.expected_total(1000.0);
    assert!((result.monthly_distribution[0] - expected).abs() <= 0.05 + 1e-9);
}

#[test]
fn all_zero_history_is_insufficient() {
    let csv = "id,size,duration_months,m1,m2,m3\nA,1000,3,0,0,0\nB,2000,2,0,0\n";
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zeros.csv");
    fs::write(&path, csv).unwrap();

    let err = run_train(&path, None, &FitConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataInsufficient);
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn predicting_from_missing_model_fails() {
    let dir = TempDir::new().unwrap();
    let request = PredictionRequest::new(1000.0, 6).unwrap();
    let err = run_predict(&dir.path().join("nope.json"), &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn holdout_on_history() {
    let dir = TempDir::new().unwrap();
    let data = write_history(&dir);
    let config = HoldoutConfig::default();

    let (ingest, report) = run_validate(&data, &FitConfig::default(), &config).unwrap();
    assert_eq!(ingest.rows_used, 6);
    assert_eq!(report.train_count + report.test_count, 6);
    assert_eq!(report.rows.len(), report.test_count);
    assert!(report.mae.is_finite());
}
