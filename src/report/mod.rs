//! Formatted terminal output for training, prediction and validation runs.

pub mod format;

pub use format::*;
