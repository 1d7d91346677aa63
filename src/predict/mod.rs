//! Prediction (the Predictor): fitted model + new project → monthly defect curve.

pub mod predictor;

pub use predictor::*;
