//! Error types for blob storage.

use thiserror::Error;

/// Result type for blob store operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Errors that can occur in blob store operations.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// No blob with the given name.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The blob name is empty or contains path components.
    #[error("invalid blob name: {0:?}")]
    InvalidName(String),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl BlobStoreError {
    /// Returns true if this error means the blob simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
