//! Monthly defect curve for a new project.
//!
//! Given a `FittedModel` and a `PredictionRequest`:
//!
//! 1. expected total defects come from the model's size calibration
//! 2. the Rayleigh density at each month `1..=n` is renormalized over the horizon
//! 3. the unrounded expected total is split across months at one-decimal resolution
//!
//! Step 3 uses largest-remainder apportionment of `round(expected · 10)` tenths,
//! so the monthly values add up to the expected total at one decimal. Only the
//! summary field `total_defects_estimated` is rounded to an integer.

use crate::domain::{FittedModel, PredictionRequest, PredictionResult};
use crate::error::AppError;
use crate::math::apportion;
use crate::models::monthly_weights;

/// Monthly values are expressed in tenths of a defect.
const TENTHS: u64 = 10;

/// Largest tenths count that keeps every share exact in `f64` (2^53).
const MAX_TENTHS: f64 = 9_007_199_254_740_992.0;

/// Predict the monthly defect curve.
///
/// Pure: identical `(model, request)` pairs produce bit-identical results.
pub fn predict(model: &FittedModel, request: &PredictionRequest) -> Result<PredictionResult, AppError> {
    model.validate()?;
    request.validate()?;

    let expected = model.calibration.expected_total(request.project_size);
    if !expected.is_finite() {
        return Err(AppError::model_corrupt(format!(
            "Calibration produced a non-finite total for size {}.",
            request.project_size
        )));
    }
    let tenths = (expected * TENTHS as f64).round();
    if tenths > MAX_TENTHS {
        return Err(AppError::invalid_request(format!(
            "'tamano' {} gives {expected:e} expected defects, beyond what the curve can represent.",
            request.project_size
        )));
    }
    let tenths = tenths as u64;
    let total = expected.round() as u64;

    let n = request.duration_months as usize;
    let weights = monthly_weights(model.shape_parameter, n).ok_or_else(|| {
        AppError::model_corrupt(format!(
            "Cannot evaluate the Rayleigh curve with shape {}.",
            model.shape_parameter
        ))
    })?;

    let monthly_distribution = apportion(&weights, tenths)
        .into_iter()
        .map(|t| t as f64 / TENTHS as f64)
        .collect();

    Ok(PredictionResult {
        total_defects_estimated: total,
        monthly_distribution,
        months: (1..=request.duration_months).collect(),
    })
}
