//! Shared test helpers for lifecycle tests.

#![allow(dead_code)]

use keygate_blobstore::MemoryBlobStore;
use keygate_license::{
    CodeSource, KeyCollection, KeyLifecycle, KeyRecord, KeyStore, KeygateConfig, RandomCodes,
};
use keygate_types::{KeyCode, ManualClock, Timestamp, MILLIS_PER_HOUR};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Fixed start time: 2025-01-01T00:00:00Z.
pub const START_MS: i64 = 1_735_689_600_000;

pub const ADMIN_SECRET: &str = "test-secret";

/// A lifecycle over an in-memory store with a manual clock.
pub struct Harness {
    pub lifecycle: Arc<KeyLifecycle>,
    pub blobs: MemoryBlobStore,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: KeygateConfig) -> Self {
        Self::build(config, Arc::new(RandomCodes))
    }

    pub fn with_codes(codes: Arc<dyn CodeSource>) -> Self {
        Self::build(test_config(), codes)
    }

    fn build(config: KeygateConfig, codes: Arc<dyn CodeSource>) -> Self {
        let blobs = MemoryBlobStore::new();
        let clock = ManualClock::new(Timestamp::from_millis(START_MS));
        let store = KeyStore::new(Arc::new(blobs.clone()));
        let lifecycle = Arc::new(
            KeyLifecycle::with_clock(store, config, Arc::new(clock.clone()))
                .with_code_source(codes),
        );
        Self {
            lifecycle,
            blobs,
            clock,
        }
    }

    pub fn advance_hours(&self, hours: i64) {
        self.clock.advance(hours * MILLIS_PER_HOUR);
    }

    pub async fn keys(&self) -> KeyCollection {
        self.lifecycle.store().load().await
    }

    /// Writes a record straight into the store, bypassing issuance.
    pub async fn seed(&self, code: &str, record: KeyRecord) {
        let mut keys = self.keys().await;
        keys.insert(KeyCode::new(code), record);
        self.lifecycle.store().save(&keys).await.unwrap();
    }
}

pub fn test_config() -> KeygateConfig {
    KeygateConfig {
        admin_secret: ADMIN_SECRET.to_string(),
        ..KeygateConfig::default()
    }
}

/// A record created `age_hours` before the start time, valid for `hours`.
pub fn record_aged(age_hours: i64, hours: u32) -> KeyRecord {
    let created = Timestamp::from_millis(START_MS - age_hours * MILLIS_PER_HOUR);
    KeyRecord::new(created, hours, "test")
}

/// Yields the given codes in order, then repeats the last one forever.
#[derive(Debug)]
pub struct ScriptedCodes {
    queue: Mutex<VecDeque<String>>,
    last: String,
    drawn: Mutex<usize>,
}

impl ScriptedCodes {
    pub fn new(codes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: codes.last().map(|c| c.to_string()).unwrap_or_default(),
            drawn: Mutex::new(0),
        })
    }

    /// How many candidates issuance has asked for.
    pub fn drawn(&self) -> usize {
        *self.drawn.lock().unwrap()
    }
}

impl CodeSource for ScriptedCodes {
    fn next_code(&self) -> KeyCode {
        *self.drawn.lock().unwrap() += 1;
        let next = self.queue.lock().unwrap().pop_front();
        KeyCode::new(next.unwrap_or_else(|| self.last.clone()))
    }
}
