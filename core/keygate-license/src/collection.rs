//! The full set of keys, persisted as one document.

use crate::key::KeyRecord;
use keygate_types::{KeyCode, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from code to record.
///
/// Serializes as a plain JSON object keyed by code. Iteration is in code
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCollection {
    keys: BTreeMap<KeyCode, KeyRecord>,
}

impl KeyCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if `code` is present.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.keys.contains_key(code)
    }

    /// Looks up a record by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&KeyRecord> {
        self.keys.get(code)
    }

    /// Looks up a record by code for mutation.
    pub fn get_mut(&mut self, code: &str) -> Option<&mut KeyRecord> {
        self.keys.get_mut(code)
    }

    /// Inserts or replaces a record, returning the previous one.
    pub fn insert(&mut self, code: KeyCode, record: KeyRecord) -> Option<KeyRecord> {
        self.keys.insert(code, record)
    }

    /// Removes a record.
    pub fn remove(&mut self, code: &str) -> Option<KeyRecord> {
        self.keys.remove(code)
    }

    /// Iterates over all keys in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyCode, &KeyRecord)> {
        self.keys.iter()
    }

    /// Number of keys not yet expired at `now`.
    #[must_use]
    pub fn active_count(&self, now: Timestamp) -> usize {
        self.keys.values().filter(|r| !r.is_expired_at(now)).count()
    }

    /// Removes every key expired at `now`, returning how many were removed.
    pub fn remove_expired(&mut self, now: Timestamp) -> usize {
        let before = self.keys.len();
        self.keys.retain(|_, record| !record.is_expired_at(now));
        before - self.keys.len()
    }
}
