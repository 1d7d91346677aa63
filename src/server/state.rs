//! Shared, read-only model handle for the prediction service.
//!
//! Protocol:
//! - readers clone the current `Arc<FittedModel>` and predict against it without holding the lock
//! - a (re)load reads the artifact fully, validates it, then swaps the whole `Arc`
//! - while no model is loaded, every request retries the load from disk
//!
//! In-flight predictions therefore always see one complete, consistent model.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::domain::FittedModel;
use crate::error::AppError;
use crate::io::read_model_json;

#[derive(Debug, Clone)]
pub struct ModelHandle {
    path: Option<PathBuf>,
    current: Arc<RwLock<Option<Arc<FittedModel>>>>,
}

impl ModelHandle {
    /// A handle backed by a model file; nothing is loaded yet.
    pub fn from_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// A handle around an in-memory model (no backing file).
    pub fn with_model(model: FittedModel) -> Self {
        Self {
            path: None,
            current: Arc::new(RwLock::new(Some(Arc::new(model)))),
        }
    }

    pub fn current(&self) -> Option<Arc<FittedModel>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Read the backing file and swap it in.
    pub fn load(&self) -> Result<Arc<FittedModel>, AppError> {
        let Some(path) = &self.path else {
            return self
                .current()
                .ok_or_else(|| AppError::model_corrupt("No model file configured and no model loaded."));
        };
        let model = Arc::new(read_model_json(path)?);
        self.swap(Arc::clone(&model));
        info!(path = %path.display(), shape = model.shape_parameter, "model loaded");
        Ok(model)
    }

    /// Current model, loading it from disk first if none is held yet.
    pub fn get_or_load(&self) -> Result<Arc<FittedModel>, AppError> {
        match self.current() {
            Some(model) => Ok(model),
            None => self.load(),
        }
    }

    /// Replace the held model wholesale.
    pub fn replace(&self, model: FittedModel) {
        self.swap(Arc::new(model));
    }

    fn swap(&self, model: Arc<FittedModel>) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(model);
    }
}
