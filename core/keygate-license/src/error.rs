//! Error types for the key lifecycle.

use keygate_blobstore::BlobStoreError;
use thiserror::Error;

/// Lifecycle errors.
///
/// Rejected validations are not errors; they are reported through
/// [`crate::ValidationResult`].
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Admin credential did not match the configured secret.
    #[error("invalid admin credential")]
    Forbidden,

    /// Requested expiry would not put `expires_at` after `created_at`.
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),

    /// Every generated code collided with an existing key.
    #[error("no unused key code found after {0} attempts")]
    CodeSpaceExhausted(u32),

    /// Backing store could not be written.
    #[error("storage error: {0}")]
    Store(#[from] BlobStoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LicenseError {
    /// Returns true if the caller presented a bad admin credential.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }
}

/// Result type for lifecycle operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
