//! Model fitting (the Estimator).
//!
//! Responsibilities:
//!
//! - generate the σ grid and refine inside the best bracket
//! - evaluate each candidate σ with closed-form per-record totals (parallel)
//! - calibrate project size → total defects
//! - assemble the `FittedModel`

pub mod calibration;
pub mod estimator;
pub mod fitter;
pub mod shape_grid;

pub use calibration::*;
pub use estimator::*;
pub use fitter::*;
pub use shape_grid::*;
