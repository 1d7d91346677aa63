//! Command-line parsing for the Rayleigh defect-curve estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting/prediction code. Paths and the bind address fall back to
//! `DEFECTS_*` environment variables (a `.env` file is honoured).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::CalibrationChoice;

pub const DEFAULT_MODEL_PATH: &str = "models/defect_model.json";
pub const DEFAULT_DATA_PATH: &str = "data/historical.csv";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rayleigh",
    version,
    about = "Rayleigh defect-curve estimator and predictor"
)]
pub struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the shape parameter and size calibration from historical projects and save the model.
    Train(TrainArgs),
    /// Predict the monthly defect curve for a new project.
    Predict(PredictArgs),
    /// Hold out part of the history, fit on the rest and score predicted totals.
    Validate(ValidateArgs),
    /// Serve predictions over HTTP.
    Serve(ServeArgs),
}

/// Estimator tuning shared by `train` and `validate`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Smallest shape parameter σ (months) in the search grid.
    #[arg(long, default_value_t = 0.25)]
    pub shape_min: f64,

    /// Largest shape parameter σ (months) in the search grid.
    #[arg(long, default_value_t = 120.0)]
    pub shape_max: f64,

    /// Number of log-spaced grid points.
    #[arg(long, default_value_t = 240)]
    pub shape_steps: usize,

    /// Golden-section refinement iterations (0 disables refinement).
    #[arg(long, default_value_t = 60)]
    pub refine_iters: usize,

    /// How project size maps to expected total defects.
    #[arg(long, value_enum, default_value_t = CalibrationChoice::Auto)]
    pub calibration: CalibrationChoice,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Historical projects CSV.
    #[arg(long, value_name = "CSV", env = "DEFECTS_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Where to write the fitted model JSON.
    #[arg(long, value_name = "JSON", env = "DEFECTS_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_out: PathBuf,

    #[command(flatten)]
    pub fit: FitArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Fitted model JSON produced by `rayleigh train`.
    #[arg(long, value_name = "JSON", env = "DEFECTS_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Project size (e.g. lines of code).
    #[arg(long = "size", visible_alias = "tamano")]
    pub size: f64,

    /// Planned duration in months (1 to 1200).
    #[arg(long = "duration", visible_alias = "duracion")]
    pub duration: u32,

    /// Render an ASCII bar chart of the monthly curve.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the monthly curve to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print the prediction as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    /// Historical projects CSV.
    #[arg(long, value_name = "CSV", env = "DEFECTS_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Fraction of projects held out for scoring.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Shuffle seed for the split.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub fit: FitArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "DEFECTS_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Fitted model JSON to serve.
    #[arg(long, value_name = "JSON", env = "DEFECTS_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}
