//! Hold-out validation of the size → total-defects calibration.
//!
//! A seeded shuffle splits the historical records into a training part and a
//! held-out part. The model is fitted on the training part only; each held-out
//! project's observed total is then compared with the calibrated prediction.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::domain::{FitConfig, FittedModel, HistoricalRecord};
use crate::error::AppError;
use crate::fit::fit;
use crate::math::{mean_absolute_error, r_squared};

/// Split settings.
#[derive(Debug, Clone, Copy)]
pub struct HoldoutConfig {
    /// Fraction of records held out for testing.
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for HoldoutConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// One held-out project.
#[derive(Debug, Clone)]
pub struct HoldoutRow {
    pub id: String,
    pub project_size: f64,
    pub actual_total: f64,
    pub predicted_total: f64,
}

impl HoldoutRow {
    pub fn abs_error(&self) -> f64 {
        (self.actual_total - self.predicted_total).abs()
    }
}

#[derive(Debug, Clone)]
pub struct HoldoutReport {
    pub train_count: usize,
    pub test_count: usize,
    pub rows: Vec<HoldoutRow>,
    /// Mean absolute error of predicted vs actual totals (defects).
    pub mae: f64,
    /// R² of predicted vs actual totals on the held-out part.
    pub r2: f64,
    pub model: FittedModel,
}

/// Deterministically split records into `(train, test)`.
///
/// At least one record ends up on each side, so two records are required.
pub fn holdout_split(
    records: &[HistoricalRecord],
    config: &HoldoutConfig,
) -> Result<(Vec<HistoricalRecord>, Vec<HistoricalRecord>), AppError> {
    if !(config.test_fraction.is_finite() && config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(AppError::config(format!(
            "Test fraction must be in (0, 1) (got {}).",
            config.test_fraction
        )));
    }
    let n = records.len();
    if n < 2 {
        return Err(AppError::data_insufficient(format!(
            "Hold-out validation needs at least 2 records (got {n})."
        )));
    }

    let n_test = ((n as f64 * config.test_fraction).round() as usize).clamp(1, n - 1);

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    order.shuffle(&mut rng);

    let test = order[..n_test].iter().map(|&i| records[i].clone()).collect();
    let train = order[n_test..].iter().map(|&i| records[i].clone()).collect();
    Ok((train, test))
}

/// Fit on the training split and score the calibration on the held-out split.
pub fn run_holdout(
    records: &[HistoricalRecord],
    fit_config: &FitConfig,
    config: &HoldoutConfig,
) -> Result<HoldoutReport, AppError> {
    let (train, test) = holdout_split(records, config)?;
    info!(train = train.len(), test = test.len(), seed = config.seed, "hold-out split");

    let model = fit(&train, fit_config)?;

    let rows: Vec<HoldoutRow> = test
        .iter()
        .map(|r| HoldoutRow {
            id: r.label(),
            project_size: r.project_size,
            actual_total: r.total_defects(),
            predicted_total: model.calibration.expected_total(r.project_size),
        })
        .collect();

    let actual: Vec<f64> = rows.iter().map(|r| r.actual_total).collect();
    let predicted: Vec<f64> = rows.iter().map(|r| r.predicted_total).collect();

    Ok(HoldoutReport {
        train_count: train.len(),
        test_count: test.len(),
        mae: mean_absolute_error(&actual, &predicted),
        r2: r_squared(&actual, &predicted),
        rows,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    /// Projects whose totals are exactly `0.002 · size`, spread over a 3-month curve.
    fn linear_dataset(n: usize) -> Vec<HistoricalRecord> {
        (0..n)
            .map(|i| {
                let size = 10_000.0 * (i + 1) as f64;
                let total = 0.002 * size;
                HistoricalRecord::new(
                    Some(format!("P{i}")),
                    size,
                    3,
                    vec![0.3 * total, 0.5 * total, 0.2 * total],
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let records = linear_dataset(10);
        let config = HoldoutConfig::default();
        let (train_a, test_a) = holdout_split(&records, &config).unwrap();
        let (train_b, test_b) = holdout_split(&records, &config).unwrap();
        assert_eq!(test_a, test_b);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a.len(), 2);
        assert_eq!(train_a.len(), 8);
        for t in &test_a {
            assert!(!train_a.contains(t));
        }
    }

    #[test]
    fn split_keeps_one_record_each_side() {
        let records = linear_dataset(2);
        let config = HoldoutConfig {
            test_fraction: 0.05,
            seed: 7,
        };
        let (train, test) = holdout_split(&records, &config).unwrap();
        assert_eq!((train.len(), test.len()), (1, 1));
    }

    #[test]
    fn split_needs_two_records() {
        let err = holdout_split(&linear_dataset(1), &HoldoutConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataInsufficient);
    }

    #[test]
    fn perfectly_linear_data_has_zero_mae() {
        let report = run_holdout(&linear_dataset(10), &FitConfig::default(), &HoldoutConfig::default()).unwrap();
        assert_eq!(report.test_count, 2);
        assert!(report.mae < 1e-6, "mae={}", report.mae);
    }
}
