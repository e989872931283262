use std::path::PathBuf;

use thiserror::Error;

/// Shown next to any batch schema failure.
pub const BATCH_SCHEMA_HINT: &str =
    "Ensure CSV columns match the training data format (numeric/int).";

/// Why a dataset cannot be fed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("missing feature column {0:?}")]
    MissingColumn(String),

    #[error("unexpected column {0:?} (not a model feature)")]
    UnexpectedColumn(String),

    #[error("column {0:?} appears more than once")]
    DuplicateColumn(String),

    #[error("column {column:?} has non-numeric type {data_type}")]
    NonNumeric { column: String, data_type: String },

    #[error("column {column:?} is empty at row {row}")]
    NullValue { column: String, row: usize },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file `{file_name}` not found (searched: {})", display_paths(.searched))]
    ArtifactNotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("error loading model from {path}: {reason}")]
    Deserialization { path: PathBuf, reason: String },

    #[error("prediction error: {0}")]
    Prediction(String),

    #[error("batch prediction failed: {0}")]
    BatchSchema(#[from] SchemaMismatch),

    #[error("could not read file: {0}")]
    FileRead(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl ModelError {
    /// Follow-up advice for the user, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::BatchSchema(_) => Some(BATCH_SCHEMA_HINT),
            _ => None,
        }
    }

    /// Whether the model itself is unusable, as opposed to a single request
    /// having failed.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ArtifactNotFound { .. } | Self::Deserialization { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
