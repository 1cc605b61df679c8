//! Identifier types for keys and client devices.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The human-shareable code of a key, e.g. `KEY-7Q2M-0ZXA-K41P`.
///
/// A code is both the primary key of the collection and the bearer
/// credential. Any non-empty string is a valid code for lookups; only
/// freshly issued codes are guaranteed to be well formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    /// Wraps an existing code without checking its shape.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Wraps user input byte for byte. Returns `None` for an empty string;
    /// padded input is kept as-is and will not match an issued code.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        if input.is_empty() {
            None
        } else {
            Some(Self(input.to_string()))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a shortened form safe to write to logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        redact(&self.0)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for KeyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque hardware identifier supplied by the client.
///
/// Not authenticated in any way; it only has to match byte-for-byte the
/// value presented on first validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wraps a device identifier. Returns `None` for an empty string.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        if input.is_empty() {
            None
        } else {
            Some(Self(input.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a shortened form safe to write to logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        redact(&self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(10).collect();
    format!("{prefix}...")
}
