//! Estimator: fit a `FittedModel` from historical records.
//!
//! Steps:
//! 1. Validate records and drop the degenerate ones (zero observed defects)
//! 2. Search the Rayleigh shape on a log-spaced grid, then refine
//! 3. Score the fit (pooled R² on cumulative defects)
//! 4. Calibrate size → total defects
//!
//! The function is pure apart from the `trained_at` timestamp; persistence is
//! the caller's job (`io::model_file`).

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{FitConfig, FittedModel, HistoricalRecord};
use crate::error::AppError;
use crate::fit::calibration::calibrate;
use crate::fit::fitter::{fit_shape, ShapeFit};
use crate::fit::shape_grid::log_space;
use crate::math::r_squared_from_sums;

/// Fit the Rayleigh model to historical records.
///
/// Records with all-zero monthly defects are skipped (they carry no timing
/// information). Returns `DataInsufficient` if nothing usable remains and
/// `InvalidData` if a record violates its invariants.
///
/// Outliers (e.g. wildly different durations) are not rejected.
pub fn fit(records: &[HistoricalRecord], config: &FitConfig) -> Result<FittedModel, AppError> {
    let (model, _) = fit_detailed(records, config)?;
    Ok(model)
}

/// Like [`fit`], but also returns the raw shape search output (per-record totals, SSE).
pub fn fit_detailed(
    records: &[HistoricalRecord],
    config: &FitConfig,
) -> Result<(FittedModel, ShapeFit), AppError> {
    config.validate()?;

    if records.is_empty() {
        return Err(AppError::data_insufficient("No historical records supplied."));
    }

    let mut usable = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        record.validate()?;
        if record.is_degenerate() {
            warn!(record = %record.label(), "skipping record with zero observed defects");
            skipped += 1;
            continue;
        }
        usable.push(record.clone());
    }

    if usable.is_empty() {
        return Err(AppError::data_insufficient(format!(
            "All {} historical records have zero observed defects; nothing to fit.",
            records.len()
        )));
    }

    let grid = log_space(config.shape_min, config.shape_max, config.shape_steps)?;
    let shape_fit = fit_shape(&usable, &grid, config.refine_iters)?;
    let fit_score = r_squared_from_sums(shape_fit.sse, shape_fit.sst);
    let calibration = calibrate(&usable, config.calibration)?;

    let model = FittedModel {
        shape_parameter: shape_fit.shape,
        fit_score,
        calibration,
        trained_at: Utc::now(),
        records_used: usable.len(),
        records_skipped: skipped,
    };
    model.validate()?;

    info!(
        shape = model.shape_parameter,
        fit_score = model.fit_score,
        calibration_score = model.calibration.score,
        records_used = model.records_used,
        records_skipped = model.records_skipped,
        "model fitted"
    );

    Ok((model, shape_fit))
}
