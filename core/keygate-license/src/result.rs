//! Structured outcomes of lifecycle operations and their wire shapes.

use crate::key::Key;
use keygate_types::MILLIS_PER_HOUR;
use serde::{Deserialize, Serialize};

/// Why a validation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No code was presented.
    NoCode,
    /// No device identifier was presented.
    NoDevice,
    /// The code is not in the store.
    InvalidKey,
    /// The key was past its expiry and has been removed.
    Expired,
    /// The key is bound to a different device.
    DeviceMismatch,
}

impl RejectReason {
    /// User-facing message for this rejection.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoCode => "No key provided",
            Self::NoDevice => "No HWID provided",
            Self::InvalidKey => "Invalid key",
            Self::Expired => "Key has expired",
            Self::DeviceMismatch => "Key already used on another device",
        }
    }
}

/// Result of validating a key against a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The device may use the key.
    Accepted {
        /// Remaining time, e.g. `"23h 59m"`.
        remaining: String,
        /// True if this call bound the device.
        first_use: bool,
    },
    /// The key may not be used.
    Rejected(RejectReason),
}

impl ValidationResult {
    /// Returns true if accepted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Returns the rejection reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// Wire shape of a validation: `{valid, message, expires?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl ValidationResponse {
    /// Response for a store fault during validation.
    #[must_use]
    pub fn server_error() -> Self {
        Self {
            valid: false,
            message: "Server error".to_string(),
            expires: None,
        }
    }
}

impl From<&ValidationResult> for ValidationResponse {
    fn from(result: &ValidationResult) -> Self {
        match result {
            ValidationResult::Accepted { remaining, .. } => Self {
                valid: true,
                message: "Key validated successfully!".to_string(),
                expires: Some(format!("{remaining} remaining")),
            },
            ValidationResult::Rejected(reason) => Self {
                valid: false,
                message: reason.message().to_string(),
                expires: None,
            },
        }
    }
}

/// Details reported for an existing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub expired: bool,
    pub hwid_bound: bool,
    /// Remaining time, or `"Expired"`.
    pub remaining: String,
    /// RFC 3339 issue time.
    pub created: String,
}

/// Result of a status check: `{exists:false}` or `{exists:true, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub exists: bool,
    #[serde(flatten)]
    pub status: Option<KeyStatus>,
}

impl StatusResult {
    /// Status for an unknown code.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            exists: false,
            status: None,
        }
    }

    /// Status for a known code.
    #[must_use]
    pub fn found(status: KeyStatus) -> Self {
        Self {
            exists: true,
            status: Some(status),
        }
    }
}

/// One row of the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    pub key: String,
    pub created: String,
    pub expires: String,
    pub expired: bool,
    pub hwid_bound: bool,
    pub remaining: String,
}

/// Admin view of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminListing {
    pub total: usize,
    pub active: usize,
    pub keys: Vec<KeySummary>,
}

/// Wire shape of an admin deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    /// Builds the response from whether a key was removed.
    #[must_use]
    pub fn from_deleted(deleted: bool) -> Self {
        let message = if deleted { "Key deleted" } else { "Key not found" };
        Self {
            success: deleted,
            message: message.to_string(),
        }
    }
}

/// Wire shape of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub success: bool,
    pub key: String,
    /// E.g. `"24 hours"`.
    pub expires_in: String,
}

impl IssueResponse {
    /// Builds the response for a freshly issued key.
    #[must_use]
    pub fn for_key(key: &Key) -> Self {
        let hours = key.record.created_at.millis_until(key.record.expires_at) / MILLIS_PER_HOUR;
        Self {
            success: true,
            key: key.code.to_string(),
            expires_in: format!("{hours} hours"),
        }
    }
}

/// Public service summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub script_name: String,
    pub total_keys: usize,
    pub key_duration_hours: u32,
    pub community_link: String,
}
