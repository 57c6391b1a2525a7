//! Error types for session persistence.

use std::path::PathBuf;

/// Failure while reading or writing a session snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SnapshotError {
    /// Whether the error is a missing snapshot file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SnapshotError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
