//! Whole-document persistence of the key collection.

use crate::collection::KeyCollection;
use crate::error::LicenseResult;
use keygate_blobstore::BlobStore;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Blob name used when none is given.
pub const DEFAULT_KEYS_BLOB: &str = "keys.json";

/// Loads and saves the [`KeyCollection`] as a single JSON blob.
///
/// `load` + modify + `save` is not atomic on its own; callers that mutate
/// must serialize those sequences (see [`crate::KeyLifecycle`]).
#[derive(Clone)]
pub struct KeyStore {
    blob: Arc<dyn BlobStore>,
    name: String,
}

impl KeyStore {
    /// Creates a store that keeps the collection in [`DEFAULT_KEYS_BLOB`].
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self::with_name(blob, DEFAULT_KEYS_BLOB)
    }

    /// Creates a store that keeps the collection under `name`.
    pub fn with_name(blob: Arc<dyn BlobStore>, name: impl Into<String>) -> Self {
        Self {
            blob,
            name: name.into(),
        }
    }

    /// Returns the blob name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the collection.
    ///
    /// A missing, unreadable or unparsable document yields an empty
    /// collection; this never fails.
    pub async fn load(&self) -> KeyCollection {
        let bytes = match self.blob.read(&self.name).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!("Key store {} not found, starting empty", self.name);
                return KeyCollection::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read key store {} from {}: {}",
                    self.name,
                    self.blob.backend_name(),
                    e
                );
                return KeyCollection::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Key store {} is corrupt, starting empty: {}", self.name, e);
                KeyCollection::new()
            }
        }
    }

    /// Overwrites the stored document with `keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the blob write fails. The
    /// caller's in-memory collection is left as is.
    pub async fn save(&self, keys: &KeyCollection) -> LicenseResult<()> {
        let bytes = serde_json::to_vec_pretty(keys)?;
        if let Err(e) = self.blob.write(&self.name, &bytes).await {
            error!("Error saving keys to {}: {}", self.blob.backend_name(), e);
            return Err(e.into());
        }
        debug!("Saved {} keys to {}", keys.len(), self.name);
        Ok(())
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("backend", &self.blob.backend_name())
            .field("name", &self.name)
            .finish()
    }
}
