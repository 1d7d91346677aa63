//! `rayleigh-defects` library crate.
//!
//! The binary (`rayleigh`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the same estimator/predictor backs the CLI and the HTTP service
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod predict;
pub mod report;
pub mod server;
pub mod validation;
