//! Named whole-document blob storage for Keygate.
//!
//! A blob store holds opaque byte documents addressed by a flat name
//! (e.g. `keys.json`). Writes always replace the whole document; there is
//! no partial update. Two backends are provided:
//!
//! - [`FsBlobStore`]: one file per blob under a root directory, replaced
//!   atomically via write-to-temp and rename.
//! - [`MemoryBlobStore`]: process-local map, with failure injection for tests.

mod error;
mod fs;
mod memory;

pub use error::{BlobStoreError, BlobStoreResult};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;

/// Abstract key-value blob storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns a short backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Reads the full content of a blob.
    ///
    /// Returns [`BlobStoreError::NotFound`] if no blob has that name.
    async fn read(&self, name: &str) -> BlobStoreResult<Vec<u8>>;

    /// Writes a blob, replacing any previous content.
    async fn write(&self, name: &str, content: &[u8]) -> BlobStoreResult<()>;

    /// Returns whether a blob with that name exists.
    async fn exists(&self, name: &str) -> BlobStoreResult<bool>;
}

/// Rejects names that could escape a flat namespace.
pub(crate) fn validate_name(name: &str) -> BlobStoreResult<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(BlobStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
