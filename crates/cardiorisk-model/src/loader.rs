//! Lazily loaded, process-lifetime model handle.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::error::ModelError;
use crate::model::Model;
use crate::resolve::{ResolverConfig, resolve_artifact};

/// Resolves and loads the model artifact once, then hands out the same
/// shared instance on every call.
///
/// Construct one at startup and pass it by reference to whatever needs a
/// model. The first outcome is kept for the life of the loader: once the
/// artifact is missing or unreadable, every later call reports the same
/// model-unavailable error without searching again.
#[derive(Debug)]
pub struct ModelLoader {
    config: ResolverConfig,
    slot: OnceLock<Result<Arc<Model>, LoadFailure>>,
}

/// Cached reason the model could not be loaded.
#[derive(Debug, Clone)]
enum LoadFailure {
    NotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },
    Unreadable {
        path: PathBuf,
        reason: String,
    },
}

impl From<LoadFailure> for ModelError {
    fn from(failure: LoadFailure) -> Self {
        match failure {
            LoadFailure::NotFound {
                file_name,
                searched,
            } => ModelError::ArtifactNotFound {
                file_name,
                searched,
            },
            LoadFailure::Unreadable { path, reason } => {
                ModelError::Deserialization { path, reason }
            }
        }
    }
}

impl ModelLoader {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            slot: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether a model has been loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.slot.get(), Some(Ok(_)))
    }

    /// Whether a load was attempted and failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.slot.get(), Some(Err(_)))
    }

    /// Return the cached model, loading it on first use.
    pub fn load(&self) -> Result<Arc<Model>, ModelError> {
        match self.slot.get_or_init(|| self.load_uncached()) {
            Ok(model) => Ok(Arc::clone(model)),
            Err(failure) => Err(failure.clone().into()),
        }
    }

    fn load_uncached(&self) -> Result<Arc<Model>, LoadFailure> {
        let Some(path) = resolve_artifact(&self.config) else {
            warn!(file = %self.config.file_name, "model artifact not found");
            return Err(LoadFailure::NotFound {
                file_name: self.config.file_name.clone(),
                searched: self.config.candidates(),
            });
        };

        let model = match Model::from_file(&path) {
            Ok(model) => Arc::new(model),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load model");
                let reason = match e {
                    ModelError::Deserialization { reason, .. } => reason,
                    other => other.to_string(),
                };
                return Err(LoadFailure::Unreadable { path, reason });
            }
        };
        info!(
            path = %path.display(),
            kind = model.kind(),
            features = model.feature_names().len(),
            proba = model.supports_proba(),
            "loaded model"
        );
        Ok(model)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
