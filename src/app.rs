//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the tracing subscriber
//! - dispatches to train / predict / validate / serve
//! - prints reports, plots and writes optional exports

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Command, FitArgs, PredictArgs, ServeArgs, TrainArgs, ValidateArgs};
use crate::domain::{FitConfig, PredictionRequest, ServeConfig};
use crate::error::AppError;
use crate::validation::HoldoutConfig;

pub mod pipeline;

/// Entry point for the `rayleigh` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine; everything has a flag or a default.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Validate(args) => handle_validate(args),
        Command::Serve(args) => handle_serve(args),
    }
}

/// Logs go to stderr so that stdout stays clean for reports and `--json` output.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    // try_init: a subscriber may already be installed (tests, embedding).
    let _ = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args.fit);
    let out = pipeline::run_train(&args.data, Some(args.model_out.as_path()), &config)?;

    println!(
        "{}",
        crate::report::format_training_summary(&out.ingest, &out.model, &out.shape_fit, &config)
    );
    println!("Model written to {}", args.model_out.display());
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let request = PredictionRequest::new(args.size, args.duration)?;
    let (model, result) = pipeline::run_predict(&args.model, &request)?;

    if args.json {
        let body = serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::io(format!("Failed to serialize prediction: {e}")))?;
        println!("{body}");
    } else {
        println!("{}", crate::report::format_prediction(&request, &model, &result));
    }

    if args.plot {
        println!(
            "{}",
            crate::plot::render_monthly_plot(&result, args.width, args.height)
        );
    }

    if let Some(path) = &args.export {
        crate::io::write_prediction_csv(path, &request, &result)?;
    }

    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args.fit);
    let holdout = HoldoutConfig {
        test_fraction: args.test_fraction,
        seed: args.seed,
    };
    let (ingest, report) = pipeline::run_validate(&args.data, &config, &holdout)?;
    println!("{}", crate::report::format_holdout(&ingest, &report, &holdout));
    Ok(())
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = ServeConfig {
        bind: args.bind,
        model_path: args.model,
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::io(format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(crate::server::serve(config))
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        shape_min: args.shape_min,
        shape_max: args.shape_max,
        shape_steps: args.shape_steps,
        refine_iters: args.refine_iters,
        calibration: args.calibration,
    }
}
