//! Rayleigh defect-discovery curve model.
//!
//! The model is implemented as small, pure functions so that the estimator and
//! the predictor share exactly one definition of the curve.

pub mod curve;

pub use curve::*;
