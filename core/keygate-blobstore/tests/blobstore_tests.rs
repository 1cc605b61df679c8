use keygate_blobstore::{BlobStore, BlobStoreError, FsBlobStore, MemoryBlobStore};
use tempfile::TempDir;

// ── Error type coverage ─────────────────────────────────────────

#[test]
fn error_display() {
    let err = BlobStoreError::NotFound("keys.json".to_string());
    assert!(format!("{err}").contains("keys.json"));
    assert!(err.is_not_found());

    let err = BlobStoreError::Storage("disk full".to_string());
    assert!(format!("{err}").contains("disk full"));
    assert!(!err.is_not_found());
}

// ── MemoryBlobStore ─────────────────────────────────────────────

#[tokio::test]
async fn memory_write_then_read() {
    let store = MemoryBlobStore::new();
    store.write("keys.json", b"{}").await.unwrap();
    assert_eq!(store.read("keys.json").await.unwrap(), b"{}");
    assert!(store.exists("keys.json").await.unwrap());
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn memory_read_missing_is_not_found() {
    let store = MemoryBlobStore::new();
    let err = store.read("keys.json").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!store.exists("keys.json").await.unwrap());
}

#[tokio::test]
async fn memory_write_replaces_content() {
    let store = MemoryBlobStore::new();
    store.write("doc", b"first version").await.unwrap();
    store.write("doc", b"v2").await.unwrap();
    assert_eq!(store.read("doc").await.unwrap(), b"v2");
}

#[tokio::test]
async fn memory_clones_share_contents() {
    let store = MemoryBlobStore::new();
    let other = store.clone();
    store.write("doc", b"shared").await.unwrap();
    assert_eq!(other.read("doc").await.unwrap(), b"shared");
    assert_eq!(other.write_count(), 1);
}

#[tokio::test]
async fn memory_injected_failures() {
    let store = MemoryBlobStore::new();
    store.write("doc", b"x").await.unwrap();

    store.set_fail_writes(true);
    assert!(matches!(
        store.write("doc", b"y").await,
        Err(BlobStoreError::Storage(_))
    ));
    assert_eq!(store.write_count(), 1);

    store.set_fail_reads(true);
    assert!(matches!(store.read("doc").await, Err(BlobStoreError::Storage(_))));

    store.set_fail_reads(false);
    store.set_fail_writes(false);
    assert_eq!(store.read("doc").await.unwrap(), b"x");
}

#[tokio::test]
async fn memory_counts_read_attempts() {
    let store = MemoryBlobStore::new();
    assert_eq!(store.read_count(), 0);

    assert!(store.read("missing").await.unwrap_err().is_not_found());
    store.write("doc", b"x").await.unwrap();
    store.read("doc").await.unwrap();
    assert_eq!(store.read_count(), 2);

    store.set_fail_reads(true);
    assert!(store.read("doc").await.is_err());
    assert_eq!(store.read_count(), 3);
    assert_eq!(store.clone().read_count(), 3);
}

#[tokio::test]
async fn invalid_names_rejected() {
    let store = MemoryBlobStore::new();
    for name in ["", "../keys.json", "a/b", ".hidden", "a\\b"] {
        assert!(
            matches!(store.write(name, b"x").await, Err(BlobStoreError::InvalidName(_))),
            "name {name:?} should be rejected"
        );
    }
}

// ── FsBlobStore ─────────────────────────────────────────────────

#[tokio::test]
async fn fs_write_then_read() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::new(dir.path().join("data"));

    assert!(!store.exists("keys.json").await.unwrap());
    store.write("keys.json", b"{\"a\":1}").await.unwrap();

    assert!(store.exists("keys.json").await.unwrap());
    assert_eq!(store.read("keys.json").await.unwrap(), b"{\"a\":1}");
    assert!(dir.path().join("data").join("keys.json").exists());
}

#[tokio::test]
async fn fs_read_missing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::new(dir.path());
    assert!(store.read("keys.json").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn fs_write_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::new(dir.path());
    store.write("keys.json", b"one").await.unwrap();
    store.write("keys.json", b"two").await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["keys.json".to_string()]);
    assert_eq!(store.read("keys.json").await.unwrap(), b"two");
}

#[tokio::test]
async fn fs_rejects_path_traversal() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::new(dir.path());
    assert!(matches!(
        store.read("../etc/passwd").await,
        Err(BlobStoreError::InvalidName(_))
    ));
}

#[test]
fn backend_names() {
    assert_eq!(MemoryBlobStore::new().backend_name(), "memory");
    assert_eq!(FsBlobStore::new("/tmp").backend_name(), "filesystem");
}
