//! Input/output helpers.
//!
//! - historical CSV ingest + validation (`ingest`)
//! - model artifact JSON read/write (`model_file`)
//! - prediction exports (CSV) (`export`)

pub mod export;
pub mod ingest;
pub mod model_file;

pub use export::*;
pub use ingest::*;
pub use model_file::*;
