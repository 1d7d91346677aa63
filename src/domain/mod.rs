//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - training inputs (`HistoricalRecord`) and outputs (`FittedModel`, `Calibration`)
//! - prediction inputs (`PredictionRequest`, `PredictionPayload`) and outputs (`PredictionResult`)
//! - run configuration (`FitConfig`, `ServeConfig`)

pub mod types;

pub use types::*;
