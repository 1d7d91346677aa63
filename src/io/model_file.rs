//! Read/write the fitted model artifact (JSON).
//!
//! The model file is the "portable" representation of a training run:
//! - the fitted shape parameter and size calibration
//! - fit diagnostics and training metadata
//!
//! Writes go to a sibling temp file which is then renamed over the target, so a
//! concurrent reader sees either the old model or the new one, never a partial file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::FittedModel;
use crate::error::AppError;

const TOOL_NAME: &str = "rayleigh";

/// On-disk envelope around a `FittedModel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub version: String,
    pub model: FittedModel,
}

impl ModelFile {
    pub fn new(model: FittedModel) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model,
        }
    }
}

/// Write a model JSON file atomically (temp file + rename).
pub fn write_model_json(path: &Path, model: &FittedModel) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::io(format!("Failed to create model directory '{}': {e}", parent.display()))
        })?;
    }

    let tmp = temp_path(path);
    let file = File::create(&tmp)
        .map_err(|e| AppError::io(format!("Failed to create model file '{}': {e}", tmp.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ModelFile::new(model.clone()))
        .map_err(|e| AppError::io(format!("Failed to write model JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush model JSON: {e}")))?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|e| {
        AppError::io(format!("Failed to move model file into place at '{}': {e}", path.display()))
    })?;

    info!(path = %path.display(), "model saved");
    Ok(())
}

/// Read a model JSON file and run the model sanity checks.
pub fn read_model_json(path: &Path) -> Result<FittedModel, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open model file '{}': {e}", path.display())))?;
    let parsed: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::model_corrupt(format!("Invalid model JSON '{}': {e}", path.display())))?;
    parsed.model.validate()?;
    Ok(parsed.model)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
