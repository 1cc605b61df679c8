//! Core type definitions for Keygate.
//!
//! This crate defines the small, storage-agnostic types shared by the
//! key lifecycle and the HTTP boundary:
//! - Epoch-millisecond timestamps and an injectable clock
//! - Key codes and device identifiers
//!
//! Key records, collections and lifecycle rules live in `keygate-license`.

mod ids;
mod timestamp;

pub use ids::{DeviceId, KeyCode};
pub use timestamp::{Clock, ManualClock, SystemClock, Timestamp, MILLIS_PER_HOUR, MILLIS_PER_MINUTE};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
