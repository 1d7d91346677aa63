//! Size → total-defects calibration.
//!
//! The predictor never re-derives totals ad hoc: the relationship between
//! project size and observed total defects is fitted here, at training time,
//! and stored alongside the shape parameter.
//!
//! - `Linear`: ordinary least squares `total = intercept + slope · size`
//! - `Proportional`: `total = slope · size`, `slope = Σ totals / Σ sizes`
//! - `Auto`: linear when at least two distinct sizes exist, else proportional

use crate::domain::{Calibration, CalibrationChoice, CalibrationMethod, HistoricalRecord};
use crate::error::AppError;
use crate::math::{fit_line, r_squared};

/// Relative spread below which sizes are considered identical.
const SIZE_SPREAD_EPS: f64 = 1e-9;

/// Fit the calibration from observed record totals.
pub fn calibrate(
    records: &[HistoricalRecord],
    choice: CalibrationChoice,
) -> Result<Calibration, AppError> {
    if records.is_empty() {
        return Err(AppError::data_insufficient("No records to calibrate."));
    }

    let sizes: Vec<f64> = records.iter().map(|r| r.project_size).collect();
    let totals: Vec<f64> = records.iter().map(HistoricalRecord::total_defects).collect();

    let method = match choice {
        CalibrationChoice::Linear => CalibrationMethod::Linear,
        CalibrationChoice::Proportional => CalibrationMethod::Proportional,
        CalibrationChoice::Auto => {
            if has_distinct_sizes(&sizes) {
                CalibrationMethod::Linear
            } else {
                CalibrationMethod::Proportional
            }
        }
    };

    let (intercept, slope) = match method {
        CalibrationMethod::Linear => {
            if !has_distinct_sizes(&sizes) {
                return Err(AppError::data_insufficient(
                    "Linear calibration needs at least two distinct project sizes.",
                ));
            }
            fit_line(&sizes, &totals).ok_or_else(|| {
                AppError::data_insufficient("Linear calibration is ill-conditioned for these sizes.")
            })?
        }
        CalibrationMethod::Proportional => {
            let size_sum: f64 = sizes.iter().sum();
            (0.0, totals.iter().sum::<f64>() / size_sum)
        }
    };

    let mut calibration = Calibration {
        method,
        slope,
        intercept,
        score: 0.0,
    };
    let fitted: Vec<f64> = sizes.iter().map(|&s| calibration.expected_total(s)).collect();
    calibration.score = r_squared(&totals, &fitted);

    Ok(calibration)
}

fn has_distinct_sizes(sizes: &[f64]) -> bool {
    let min = sizes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sizes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    sizes.len() >= 2 && (max - min) > SIZE_SPREAD_EPS * max.abs().max(1.0)
}
