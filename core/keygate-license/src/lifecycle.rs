//! The key lifecycle: issue, validate/bind, status, sweep and admin actions.
//!
//! Per-key states:
//!
//! ```text
//! Unissued --issue--> Issued (unbound) --validate--> Bound
//!                          |                           |
//!                          +-------- now > expiry -----+--> Expired (removed)
//! ```
//!
//! Every mutating operation loads the whole collection, changes it and
//! saves it back while holding `write_lock`. Read-only operations load
//! without the lock and may observe a slightly stale collection.

use crate::collection::KeyCollection;
use crate::config::KeygateConfig;
use crate::error::{LicenseError, LicenseResult};
use crate::key::{format_remaining, CodeSource, Key, KeyRecord, RandomCodes};
use crate::result::{
    AdminListing, KeyStatus, KeySummary, RejectReason, ServiceInfo, StatusResult,
    ValidationResult,
};
use crate::store::KeyStore;
use keygate_types::{Clock, DeviceId, KeyCode, SystemClock, Timestamp};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// `created_by` of keys issued through the admin path.
pub const ADMIN_ISSUER: &str = "admin";

/// Attempts at finding an unused code before giving up.
pub const MAX_CODE_ATTEMPTS: u32 = 16;

/// Issues, binds and expires keys over a [`KeyStore`].
pub struct KeyLifecycle {
    store: KeyStore,
    config: KeygateConfig,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeSource>,
    admin_digest: [u8; 32],
    write_lock: Mutex<()>,
}

impl KeyLifecycle {
    /// Creates a lifecycle using the system clock.
    pub fn new(store: KeyStore, config: KeygateConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Creates a lifecycle with an explicit clock.
    pub fn with_clock(store: KeyStore, config: KeygateConfig, clock: Arc<dyn Clock>) -> Self {
        let admin_digest = Sha256::digest(config.admin_secret.as_bytes()).into();
        Self {
            store,
            config,
            clock,
            codes: Arc::new(RandomCodes),
            admin_digest,
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the source of candidate codes.
    #[must_use]
    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &KeygateConfig {
        &self.config
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    // ── Issuance ─────────────────────────────────────────────────

    /// Sweeps expired keys, then issues a new key for `issuer`.
    ///
    /// `expiry_hours` defaults to the configured lifetime.
    ///
    /// # Errors
    ///
    /// Fails if the expiry is zero, no unused code could be found, or the
    /// store cannot be written.
    pub async fn issue(&self, expiry_hours: Option<u32>, issuer: &str) -> LicenseResult<Key> {
        let hours = self.resolve_hours(expiry_hours)?;

        let _guard = self.write_lock.lock().await;
        let mut keys = self.store.load().await;
        let now = self.clock.now();

        let cleaned = keys.remove_expired(now);
        if cleaned > 0 {
            info!("Cleaned {} expired keys", cleaned);
        }

        let key = insert_new_key(&mut keys, self.codes.as_ref(), now, hours, issuer)?;
        self.store.save(&keys).await?;
        info!("New key generated: {} (by {})", key.code.redacted(), issuer);
        Ok(key)
    }

    /// Issues a key from the admin path: no sweep, `created_by` is
    /// [`ADMIN_ISSUER`].
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Forbidden`] on a bad credential, otherwise
    /// the same errors as [`Self::issue`].
    pub async fn admin_issue(
        &self,
        credential: &str,
        expiry_hours: Option<u32>,
    ) -> LicenseResult<Key> {
        self.authorize(credential)?;
        let hours = self.resolve_hours(expiry_hours)?;

        let _guard = self.write_lock.lock().await;
        let mut keys = self.store.load().await;
        let now = self.clock.now();

        let key = insert_new_key(&mut keys, self.codes.as_ref(), now, hours, ADMIN_ISSUER)?;
        self.store.save(&keys).await?;
        info!("Admin generated key {} for {}h", key.code.redacted(), hours);
        Ok(key)
    }

    fn resolve_hours(&self, requested: Option<u32>) -> LicenseResult<u32> {
        let hours = requested.unwrap_or(self.config.key_expiry_hours);
        if hours == 0 {
            return Err(LicenseError::InvalidExpiry(
                "expiry must be at least one hour".to_string(),
            ));
        }
        Ok(hours)
    }

    // ── Validation ───────────────────────────────────────────────

    /// Validates `code` for `device`, binding the device on first use.
    ///
    /// Expired keys are removed as a side effect. Repeat validation from
    /// the bound device changes nothing.
    ///
    /// # Errors
    ///
    /// Only store write failures are errors; every refusal is a
    /// [`ValidationResult::Rejected`].
    pub async fn validate(
        &self,
        code: Option<&str>,
        device: Option<&str>,
    ) -> LicenseResult<ValidationResult> {
        let Some(code) = code.and_then(KeyCode::parse) else {
            return Ok(ValidationResult::Rejected(RejectReason::NoCode));
        };
        let Some(device) = device.and_then(DeviceId::parse) else {
            return Ok(ValidationResult::Rejected(RejectReason::NoDevice));
        };
        debug!(
            "Validation request: key {} hwid {}",
            code.redacted(),
            device.redacted()
        );

        let _guard = self.write_lock.lock().await;
        let mut keys = self.store.load().await;
        let now = self.clock.now();

        let expired = match keys.get(code.as_str()) {
            None => return Ok(ValidationResult::Rejected(RejectReason::InvalidKey)),
            Some(record) => record.is_expired_at(now),
        };
        if expired {
            keys.remove(code.as_str());
            self.store.save(&keys).await?;
            info!("Removed expired key {} on validation", code.redacted());
            return Ok(ValidationResult::Rejected(RejectReason::Expired));
        }

        let Some(record) = keys.get_mut(code.as_str()) else {
            return Ok(ValidationResult::Rejected(RejectReason::InvalidKey));
        };
        let first_use = match &record.bound_device {
            None => {
                record.bind(device, now);
                true
            }
            Some(bound) if *bound != device => {
                warn!("Key {} presented by a second device", code.redacted());
                return Ok(ValidationResult::Rejected(RejectReason::DeviceMismatch));
            }
            Some(_) => false,
        };
        let remaining = format_remaining(now.millis_until(record.expires_at));

        if first_use {
            self.store.save(&keys).await?;
            info!("HWID bound to key {}", code.redacted());
        }
        Ok(ValidationResult::Accepted {
            remaining,
            first_use,
        })
    }

    // ── Read-only views ──────────────────────────────────────────

    /// Reports the state of `code` without modifying anything.
    pub async fn check_status(&self, code: &str) -> StatusResult {
        let Some(code) = KeyCode::parse(code) else {
            return StatusResult::missing();
        };
        let keys = self.store.load().await;
        let now = self.clock.now();

        match keys.get(code.as_str()) {
            None => StatusResult::missing(),
            Some(record) => StatusResult::found(KeyStatus {
                expired: record.is_expired_at(now),
                hwid_bound: record.is_bound(),
                remaining: record.remaining_at(now),
                created: record.created_at.to_rfc3339(),
            }),
        }
    }

    /// Lists every key with aggregate counts.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Forbidden`] on a bad credential.
    pub async fn admin_list(&self, credential: &str) -> LicenseResult<AdminListing> {
        self.authorize(credential)?;
        let keys = self.store.load().await;
        let now = self.clock.now();
        Ok(listing(&keys, now))
    }

    /// Public counters and display settings.
    pub async fn info(&self) -> ServiceInfo {
        let keys = self.store.load().await;
        ServiceInfo {
            script_name: self.config.script_name.clone(),
            total_keys: keys.len(),
            key_duration_hours: self.config.key_expiry_hours,
            community_link: self.config.community_link.clone(),
        }
    }

    // ── Removal ──────────────────────────────────────────────────

    /// Removes every key whose expiry is before now. Saves only if
    /// something was removed.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be written.
    pub async fn sweep_expired(&self) -> LicenseResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut keys = self.store.load().await;
        let removed = keys.remove_expired(self.clock.now());
        if removed > 0 {
            self.store.save(&keys).await?;
            info!("Cleaned {} expired keys", removed);
        }
        Ok(removed)
    }

    /// Deletes `code` if present. Returns whether a key was removed.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Forbidden`] on a bad credential, or a store
    /// error if the deletion could not be saved.
    pub async fn admin_delete(&self, credential: &str, code: &str) -> LicenseResult<bool> {
        self.authorize(credential)?;
        let Some(code) = KeyCode::parse(code) else {
            return Ok(false);
        };

        let _guard = self.write_lock.lock().await;
        let mut keys = self.store.load().await;
        if keys.remove(code.as_str()).is_none() {
            return Ok(false);
        }
        self.store.save(&keys).await?;
        info!("Admin deleted key {}", code.redacted());
        Ok(true)
    }

    // ── Authorization ────────────────────────────────────────────

    /// Checks an admin credential against the configured secret.
    ///
    /// Both sides are hashed before comparison, so the check does not
    /// short-circuit on the secret's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Forbidden`] on mismatch.
    pub fn authorize(&self, credential: &str) -> LicenseResult<()> {
        let presented: [u8; 32] = Sha256::digest(credential.as_bytes()).into();
        if presented == self.admin_digest {
            Ok(())
        } else {
            warn!("Rejected admin request with invalid credential");
            Err(LicenseError::Forbidden)
        }
    }
}

impl std::fmt::Debug for KeyLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLifecycle")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("codes", &self.codes)
            .finish_non_exhaustive()
    }
}

/// Generates an unused code and inserts a fresh record for it.
fn insert_new_key(
    keys: &mut KeyCollection,
    codes: &dyn CodeSource,
    now: Timestamp,
    hours: u32,
    issuer: &str,
) -> LicenseResult<Key> {
    let code = unused_code(keys, codes)?;
    let record = KeyRecord::new(now, hours, issuer);
    keys.insert(code.clone(), record.clone());
    Ok(Key { code, record })
}

fn unused_code(keys: &KeyCollection, codes: &dyn CodeSource) -> LicenseResult<KeyCode> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = codes.next_code();
        if !keys.contains(code.as_str()) {
            return Ok(code);
        }
        warn!("Generated key code collided with an existing key, retrying");
    }
    Err(LicenseError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
}

fn listing(keys: &KeyCollection, now: Timestamp) -> AdminListing {
    let summaries: Vec<KeySummary> = keys
        .iter()
        .map(|(code, record)| KeySummary {
            key: code.to_string(),
            created: record.created_at.to_rfc3339(),
            expires: record.expires_at.to_rfc3339(),
            expired: record.is_expired_at(now),
            hwid_bound: record.is_bound(),
            remaining: record.remaining_at(now),
        })
        .collect();

    AdminListing {
        total: summaries.len(),
        active: keys.active_count(now),
        keys: summaries,
    }
}
