//! Wall-clock timestamps and the clock abstraction used for expiry checks.
//!
//! Timestamps are milliseconds since the Unix epoch, which is also the
//! persisted representation. All "now" reads in the lifecycle go through a
//! [`Clock`] so tests can pin or advance time.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// A point in time, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from epoch milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the current system time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Returns the epoch milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Returns this timestamp shifted forward by `hours`.
    #[must_use]
    pub const fn plus_hours(&self, hours: u32) -> Self {
        Self(self.0.saturating_add(hours as i64 * MILLIS_PER_HOUR))
    }

    /// Milliseconds from `self` until `later`. Negative if `later` is in the past.
    #[must_use]
    pub const fn millis_until(&self, later: Timestamp) -> i64 {
        later.0.saturating_sub(self.0)
    }

    /// Converts to a UTC date-time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimestamp`] if the value is outside chrono's range.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{} ms out of range", self.0)))
    }

    /// Renders as RFC 3339 with millisecond precision and a `Z` suffix,
    /// e.g. `2025-01-01T00:00:00.000Z`. Out-of-range values fall back to
    /// the raw millisecond count.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        match self.to_datetime() {
            Ok(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Err(_) => self.0.to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.as_millis())),
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        self.millis.store(at.as_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.millis.load(Ordering::SeqCst))
    }
}
