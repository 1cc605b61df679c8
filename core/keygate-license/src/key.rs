//! Key records, code generation and remaining-time formatting.
//!
//! Codes use the format `KEY-XXXX-XXXX-XXXX`: a fixed prefix followed by
//! three dash-separated groups of four characters drawn from `A-Z0-9`,
//! giving 36^12 (about 4.7e18) possible codes.
//!
//! Codes are meant to be pasted by people, not to resist guessing.

use keygate_types::{DeviceId, KeyCode, Timestamp, MILLIS_PER_HOUR, MILLIS_PER_MINUTE};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix of every generated code.
pub const CODE_PREFIX: &str = "KEY";

/// Symbols used in the random groups.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random groups after the prefix.
pub const CODE_GROUPS: usize = 3;

/// Characters per random group.
pub const CODE_GROUP_LEN: usize = 4;

const CODE_DELIMITER: char = '-';

/// Generates a new random code.
pub fn generate_code<R: Rng>(rng: &mut R) -> KeyCode {
    let mut code =
        String::with_capacity(CODE_PREFIX.len() + CODE_GROUPS * (CODE_GROUP_LEN + 1));
    code.push_str(CODE_PREFIX);
    for _ in 0..CODE_GROUPS {
        code.push(CODE_DELIMITER);
        for _ in 0..CODE_GROUP_LEN {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[idx] as char);
        }
    }
    KeyCode::new(code)
}

/// Supplies candidate codes to issuance.
pub trait CodeSource: Send + Sync + std::fmt::Debug {
    /// Returns the next candidate. Issuance retries on collision, so a
    /// source may repeat itself.
    fn next_code(&self) -> KeyCode;
}

/// Draws codes from the thread-local RNG via [`generate_code`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&self) -> KeyCode {
        generate_code(&mut rand::thread_rng())
    }
}

/// Returns true if `code` has exactly the generated shape.
#[must_use]
pub fn is_well_formed_code(code: &str) -> bool {
    let mut parts = code.split(CODE_DELIMITER);
    if parts.next() != Some(CODE_PREFIX) {
        return false;
    }
    let groups: Vec<&str> = parts.collect();
    groups.len() == CODE_GROUPS
        && groups.iter().all(|g| {
            g.len() == CODE_GROUP_LEN && g.bytes().all(|b| CODE_ALPHABET.contains(&b))
        })
}

/// Formats a remaining duration as `"{hours}h {minutes}m"`, truncating.
///
/// Negative durations render as `"0h 0m"`.
#[must_use]
pub fn format_remaining(remaining_ms: i64) -> String {
    let ms = remaining_ms.max(0);
    let hours = ms / MILLIS_PER_HOUR;
    let minutes = (ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    format!("{hours}h {minutes}m")
}

/// The persisted state of one key. The code itself is the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    /// When the key was issued.
    pub created_at: Timestamp,
    /// When the key stops validating.
    pub expires_at: Timestamp,
    /// Device the key is locked to, set on first successful validation.
    pub bound_device: Option<DeviceId>,
    /// Number of binds; 0 before first use, 1 afterwards.
    pub use_count: u32,
    /// Issuing actor or channel.
    pub created_by: String,
    /// When the key was bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_used_at: Option<Timestamp>,
}

impl KeyRecord {
    /// Creates an unbound record valid for `hours` from `now`.
    #[must_use]
    pub fn new(now: Timestamp, hours: u32, created_by: impl Into<String>) -> Self {
        Self {
            created_at: now,
            expires_at: now.plus_hours(hours),
            bound_device: None,
            use_count: 0,
            created_by: created_by.into(),
            first_used_at: None,
        }
    }

    /// Returns true once `now` is strictly past the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    /// Returns true if a device has been bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound_device.is_some()
    }

    /// Remaining time as shown to users, or `"Expired"`.
    #[must_use]
    pub fn remaining_at(&self, now: Timestamp) -> String {
        if self.is_expired_at(now) {
            "Expired".to_string()
        } else {
            format_remaining(now.millis_until(self.expires_at))
        }
    }

    /// Binds `device` as the first use. Does nothing if already bound.
    pub(crate) fn bind(&mut self, device: DeviceId, now: Timestamp) {
        if self.bound_device.is_some() {
            return;
        }
        self.bound_device = Some(device);
        self.use_count = 1;
        self.first_used_at = Some(now);
    }
}

/// A key code together with its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// The code handed to the user.
    pub code: KeyCode,
    /// The persisted state.
    #[serde(flatten)]
    pub record: KeyRecord,
}
