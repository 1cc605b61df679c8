//! In-memory blob store.

use crate::error::{BlobStoreError, BlobStoreResult};
use crate::{validate_name, BlobStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Blob store that keeps everything in a shared map.
///
/// Clones share the same contents. Reads and writes can be made to fail on
/// demand. Read attempts and successful writes are counted, which lets
/// callers assert that an operation did or did not touch storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read fail with a storage error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of read attempts so far, failed ones included.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, name: &str) -> BlobStoreResult<Vec<u8>> {
        validate_name(name)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BlobStoreError::Storage("injected read failure".to_string()));
        }
        self.blobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(name.to_string()))
    }

    async fn write(&self, name: &str, content: &[u8]) -> BlobStoreResult<()> {
        validate_name(name)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BlobStoreError::Storage("injected write failure".to_string()));
        }
        self.blobs
            .write()
            .await
            .insert(name.to_string(), content.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, name: &str) -> BlobStoreResult<bool> {
        validate_name(name)?;
        Ok(self.blobs.read().await.contains_key(name))
    }
}
