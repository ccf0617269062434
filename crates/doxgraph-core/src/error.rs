//! Error types for doxgraph-core.

use std::path::PathBuf;

/// Errors raised while persisting or loading a resolved graph.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot version {found} does not match {expected}")]
    VersionMismatch { found: String, expected: String },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }
}
