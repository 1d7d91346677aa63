//! Shared pipeline steps used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> shape search -> calibration -> model artifact -> prediction
//!
//! The command handlers can then focus on presentation (tables, plots, exports).

use std::path::Path;

use crate::domain::{FitConfig, FittedModel, PredictionRequest, PredictionResult};
use crate::error::AppError;
use crate::fit::{ShapeFit, fit_detailed};
use crate::io::{IngestedData, load_historical_records, read_model_json, write_model_json};
use crate::predict::predict;
use crate::validation::{HoldoutConfig, HoldoutReport, run_holdout};

/// All computed outputs of a single `rayleigh train` run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub ingest: IngestedData,
    pub model: FittedModel,
    pub shape_fit: ShapeFit,
}

/// Load history, fit the model and (optionally) persist it.
pub fn run_train(data: &Path, model_out: Option<&Path>, config: &FitConfig) -> Result<TrainOutput, AppError> {
    let ingest = load_historical_records(data)?;
    let (model, shape_fit) = fit_detailed(&ingest.records, config)?;

    if let Some(path) = model_out {
        write_model_json(path, &model)?;
    }

    Ok(TrainOutput {
        ingest,
        model,
        shape_fit,
    })
}

/// Load a saved model and predict one project's monthly curve.
pub fn run_predict(model_path: &Path, request: &PredictionRequest) -> Result<(FittedModel, PredictionResult), AppError> {
    let model = read_model_json(model_path)?;
    let result = predict(&model, request)?;
    Ok((model, result))
}

/// Load history and run hold-out validation.
pub fn run_validate(
    data: &Path,
    fit_config: &FitConfig,
    holdout: &HoldoutConfig,
) -> Result<(IngestedData, HoldoutReport), AppError> {
    let ingest = load_historical_records(data)?;
    let report = run_holdout(&ingest.records, fit_config, holdout)?;
    Ok((ingest, report))
}
