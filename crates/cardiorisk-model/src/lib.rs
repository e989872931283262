//! Model layer: artifact lookup and loading, single-record and batch scoring.

pub mod artifact;
pub mod batch;
mod error;
pub mod loader;
mod model;
pub mod predict;
pub mod resolve;

#[cfg(test)]
mod test_support;

pub use artifact::{ClassLabel, Estimator, ModelArtifact};
pub use batch::{ScoredBatch, read_csv, read_csv_file, score_batch, write_csv};
pub use error::{BATCH_SCHEMA_HINT, ModelError, SchemaMismatch};
pub use loader::ModelLoader;
pub use model::Model;
pub use predict::{Diagnosis, PredictionResult, predict_record};
pub use resolve::{DEFAULT_MODEL_FILE, ResolverConfig, resolve_artifact};
