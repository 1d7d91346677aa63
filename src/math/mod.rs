//! Mathematical utilities: Rayleigh primitives, least squares, fit metrics.

pub mod ols;
pub mod rayleigh;
pub mod stats;

pub use ols::*;
pub use stats::*;
