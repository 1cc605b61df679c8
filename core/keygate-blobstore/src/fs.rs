//! File-system blob store.
//!
//! Each blob is a file directly under the root directory. Writes go to a
//! hidden sibling temp file first and are renamed over the target, so
//! readers see either the old or the new document, never a torn one.

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::{validate_name, BlobStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Blob store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily
    /// on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, name: &str) -> BlobStoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    async fn ensure_root(&self) -> BlobStoreResult<()> {
        if fs::try_exists(&self.root).await? {
            return Ok(());
        }
        fs::create_dir_all(&self.root).await?;
        info!("Created blob store directory: {:?}", self.root);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn read(&self, name: &str) -> BlobStoreResult<Vec<u8>> {
        let path = self.blob_path(name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, content: &[u8]) -> BlobStoreResult<()> {
        let path = self.blob_path(name)?;
        self.ensure_root().await?;

        let tmp = self.root.join(format!(".{name}.tmp"));
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }

    async fn exists(&self, name: &str) -> BlobStoreResult<bool> {
        let path = self.blob_path(name)?;
        Ok(fs::try_exists(&path).await?)
    }
}
