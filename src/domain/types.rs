//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and prediction
//! - persisted as the JSON model artifact
//! - returned over HTTP with the field names the dashboard expects

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Upper bound tolerated on a persisted fit score (R² can never exceed 1).
const FIT_SCORE_SLACK: f64 = 1e-9;

/// One historical project: size, duration and defects discovered per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub id: Option<String>,
    /// Project size (KLOC, function points, ...).
    pub project_size: f64,
    pub duration_months: u32,
    /// Defects discovered in months `1..=duration_months`.
    pub defects_per_month: Vec<f64>,
}

impl HistoricalRecord {
    pub fn new(
        id: Option<String>,
        project_size: f64,
        duration_months: u32,
        defects_per_month: Vec<f64>,
    ) -> Result<Self, AppError> {
        let record = Self {
            id,
            project_size,
            duration_months,
            defects_per_month,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the record invariants (positive size, `len == duration`, finite non-negative counts).
    pub fn validate(&self) -> Result<(), AppError> {
        let label = self.label();
        if !(self.project_size.is_finite() && self.project_size > 0.0) {
            return Err(AppError::invalid_data(format!(
                "Record {label}: project size must be finite and > 0 (got {}).",
                self.project_size
            )));
        }
        if self.duration_months == 0 {
            return Err(AppError::invalid_data(format!(
                "Record {label}: duration must be at least 1 month."
            )));
        }
        if self.defects_per_month.len() != self.duration_months as usize {
            return Err(AppError::invalid_data(format!(
                "Record {label}: {} monthly values for a {}-month duration.",
                self.defects_per_month.len(),
                self.duration_months
            )));
        }
        if let Some(bad) = self
            .defects_per_month
            .iter()
            .find(|v| !(v.is_finite() && **v >= 0.0))
        {
            return Err(AppError::invalid_data(format!(
                "Record {label}: monthly defect counts must be finite and >= 0 (got {bad})."
            )));
        }
        Ok(())
    }

    pub fn total_defects(&self) -> f64 {
        self.defects_per_month.iter().sum()
    }

    /// Running total of discovered defects for months `1..=duration`.
    pub fn cumulative_defects(&self) -> Vec<f64> {
        let mut acc = 0.0;
        self.defects_per_month
            .iter()
            .map(|v| {
                acc += v;
                acc
            })
            .collect()
    }

    /// A record with no observed defects carries no timing information.
    pub fn is_degenerate(&self) -> bool {
        self.total_defects() <= 0.0
    }

    pub fn label(&self) -> String {
        self.id.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// How the size → total-defects relationship is calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMethod {
    /// `total = intercept + slope * size` (ordinary least squares).
    Linear,
    /// `total = slope * size` with `slope = Σ totals / Σ sizes`.
    Proportional,
}

/// Requested calibration method.
///
/// `Auto` means: linear when at least two distinct sizes exist, else proportional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationChoice {
    Auto,
    Linear,
    Proportional,
}

/// Fitted size → total-defects relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub method: CalibrationMethod,
    pub slope: f64,
    pub intercept: f64,
    /// R² of the calibration against observed record totals.
    pub score: f64,
}

impl Calibration {
    /// Expected total defects for a project of the given size (never negative).
    pub fn expected_total(&self, project_size: f64) -> f64 {
        (self.intercept + self.slope * project_size).max(0.0)
    }
}

/// Output of one training run. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Rayleigh σ: the month at which defect discovery peaks.
    pub shape_parameter: f64,
    /// Pooled R² of fitted vs observed cumulative defects.
    pub fit_score: f64,
    pub calibration: Calibration,
    pub trained_at: DateTime<Utc>,
    pub records_used: usize,
    pub records_skipped: usize,
}

impl FittedModel {
    /// Sanity checks applied to any model before it is used for prediction.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.shape_parameter.is_finite() && self.shape_parameter > 0.0) {
            return Err(AppError::model_corrupt(format!(
                "shape_parameter must be finite and > 0 (got {}).",
                self.shape_parameter
            )));
        }
        if self.fit_score.is_nan() || self.fit_score > 1.0 + FIT_SCORE_SLACK {
            return Err(AppError::model_corrupt(format!(
                "fit_score must be a number <= 1 (got {}).",
                self.fit_score
            )));
        }
        if !(self.calibration.slope.is_finite() && self.calibration.intercept.is_finite()) {
            return Err(AppError::model_corrupt(
                "Calibration coefficients must be finite.",
            ));
        }
        Ok(())
    }
}

/// Longest prediction horizon accepted, in months (100 years).
pub const MAX_DURATION_MONTHS: u32 = 1200;

/// A validated prediction request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRequest {
    pub project_size: f64,
    pub duration_months: u32,
}

impl PredictionRequest {
    pub fn new(project_size: f64, duration_months: u32) -> Result<Self, AppError> {
        let request = Self {
            project_size,
            duration_months,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.project_size.is_finite() && self.project_size > 0.0) {
            return Err(AppError::invalid_request(format!(
                "'tamano' must be a number > 0 (got {}).",
                self.project_size
            )));
        }
        if self.duration_months == 0 {
            return Err(AppError::invalid_request(
                "'duracion' must be an integer >= 1.",
            ));
        }
        if self.duration_months > MAX_DURATION_MONTHS {
            return Err(AppError::invalid_request(format!(
                "'duracion' must be at most {MAX_DURATION_MONTHS} months (got {}).",
                self.duration_months
            )));
        }
        Ok(())
    }
}

/// Raw prediction request as received from the dashboard.
///
/// Fields are kept as JSON values so that numeric strings (`"12"`) are accepted
/// and type problems surface as `InvalidRequest` rather than a decoder error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionPayload {
    #[serde(default)]
    pub tamano: Option<Value>,
    #[serde(default)]
    pub duracion: Option<Value>,
}

impl TryFrom<PredictionPayload> for PredictionRequest {
    type Error = AppError;

    fn try_from(payload: PredictionPayload) -> Result<Self, Self::Error> {
        let (Some(tamano), Some(duracion)) = (payload.tamano, payload.duracion) else {
            return Err(AppError::invalid_request(
                "Missing required fields: 'tamano' and 'duracion' are required.",
            ));
        };

        let size = numeric_field("tamano", &tamano)?;
        let duration = numeric_field("duracion", &duracion)?;

        if !(duration.is_finite() && duration >= 1.0) {
            return Err(AppError::invalid_request(format!(
                "'duracion' must be an integer >= 1 (got {duration})."
            )));
        }
        if duration.fract() != 0.0 || duration > u32::MAX as f64 {
            return Err(AppError::invalid_request(format!(
                "'duracion' must be a whole number of months (got {duration})."
            )));
        }

        PredictionRequest::new(size, duration as u32)
    }
}

fn numeric_field(name: &str, value: &Value) -> Result<f64, AppError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::invalid_request(format!(
            "'{name}' must be numeric (got {value})."
        ))),
    }
}

/// Monthly defect curve for a new project.
///
/// Serialized with the field names existing dashboard consumers rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "total_defectos_estimados")]
    pub total_defects_estimated: u64,
    #[serde(rename = "distribucion_tiempo")]
    pub monthly_distribution: Vec<f64>,
    #[serde(rename = "meses_proyectados")]
    pub months: Vec<u32>,
}

impl PredictionResult {
    /// Month (1-based) with the largest expected defect count; earliest wins ties.
    pub fn peak_month(&self) -> Option<u32> {
        let mut best: Option<(u32, f64)> = None;
        for (&m, &v) in self.months.iter().zip(self.monthly_distribution.iter()) {
            match best {
                Some((_, bv)) if v <= bv => {}
                _ => best = Some((m, v)),
            }
        }
        best.map(|(m, _)| m)
    }

    pub fn distribution_sum(&self) -> f64 {
        self.monthly_distribution.iter().sum()
    }
}

/// Training configuration as understood by the estimator.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Smallest σ (months) considered by the grid search.
    pub shape_min: f64,
    /// Largest σ (months) considered by the grid search.
    pub shape_max: f64,
    pub shape_steps: usize,
    /// Golden-section iterations inside the best grid bracket (0 disables refinement).
    pub refine_iters: usize,
    pub calibration: CalibrationChoice,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            shape_min: 0.25,
            shape_max: 120.0,
            shape_steps: 240,
            refine_iters: 60,
            calibration: CalibrationChoice::Auto,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.shape_min.is_finite()
            && self.shape_max.is_finite()
            && self.shape_min > 0.0
            && self.shape_max > self.shape_min)
        {
            return Err(AppError::config(format!(
                "Invalid shape range: min={}, max={} (must be finite, >0, and max>min).",
                self.shape_min, self.shape_max
            )));
        }
        if self.shape_steps < 2 {
            return Err(AppError::config("Shape grid steps must be >= 2."));
        }
        Ok(())
    }
}

/// Settings for the prediction service.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub bind: String,
    pub model_path: PathBuf,
}
