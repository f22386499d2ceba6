use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during snapshot storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {id}. Run 'strata snapshots list' to see available snapshots")]
    SnapshotNotFound { id: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        StorageError::SnapshotNotFound { id: id.into() }
    }
}
