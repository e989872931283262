//! Model artifact lookup over a fixed list of candidate directories.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Default artifact file name.
pub const DEFAULT_MODEL_FILE: &str = "best_model.pkl";

/// Directories searched for the artifact, in priority order, relative to the
/// base directory. The empty entry is the base directory itself.
pub const DEFAULT_SEARCH_DIRS: &[&str] = &["models", "src", "", "../models"];

/// Where to look for the model artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub file_name: String,
    /// Root the search directories are relative to (usually the working directory).
    pub base_dir: PathBuf,
    pub search_dirs: Vec<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_MODEL_FILE.to_string(),
            base_dir: PathBuf::new(),
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl ResolverConfig {
    /// Default search order for a different file name.
    pub fn for_file(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Candidate paths in priority order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| join_non_empty(&self.base_dir, dir).join(&self.file_name))
            .collect()
    }
}

/// Return the first candidate path that exists, or `None` if none do.
pub fn resolve_artifact(config: &ResolverConfig) -> Option<PathBuf> {
    config.candidates().into_iter().find(|path| {
        let found = path.exists();
        debug!(path = %path.display(), found, "probing model path");
        found
    })
}

fn join_non_empty(base: &Path, dir: &Path) -> PathBuf {
    if dir.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(dir)
    }
}
