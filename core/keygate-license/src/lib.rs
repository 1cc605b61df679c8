//! Key issuance, device binding and expiry for Keygate.
//!
//! This crate handles:
//! - Generation of human-shareable key codes (`KEY-XXXX-XXXX-XXXX`)
//! - First-use binding of a key to a single device identifier
//! - Expiry checks, lazy sweeping and admin overrides
//! - Whole-document persistence of the key collection
//!
//! # Design Principles
//!
//! - **One device per key**: the first device to validate a key owns it
//! - **Lazy expiry**: expired keys are removed when validated or swept,
//!   status checks never mutate
//! - **Serialized writes**: every load-modify-save runs under one lock per
//!   [`KeyLifecycle`], so concurrent first binds cannot both win
//! - **Permissive load**: a missing or corrupt store reads as empty

mod collection;
mod config;
mod error;
mod key;
mod lifecycle;
mod result;
mod store;

pub use collection::KeyCollection;
pub use config::KeygateConfig;
pub use error::{LicenseError, LicenseResult};
pub use key::{
    format_remaining, generate_code, is_well_formed_code, CodeSource, Key, KeyRecord,
    RandomCodes, CODE_ALPHABET, CODE_GROUPS, CODE_GROUP_LEN, CODE_PREFIX,
};
pub use lifecycle::{KeyLifecycle, ADMIN_ISSUER, MAX_CODE_ATTEMPTS};
pub use result::{
    AdminListing, DeleteResponse, IssueResponse, KeyStatus, KeySummary, RejectReason,
    ServiceInfo, StatusResult, ValidationResponse, ValidationResult,
};
pub use store::{KeyStore, DEFAULT_KEYS_BLOB};
