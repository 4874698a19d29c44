use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Prefix shared by every persisted day entry.
pub const STORAGE_PREFIX: &str = "stars-";

/// A calendar day as `YYYY-MM-DD`, used to partition persisted stars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(String);

impl DayKey {
    /// Day containing `millis` (Unix epoch) in the given offset. Out-of-range
    /// timestamps collapse to the epoch day.
    pub fn from_millis(millis: i64, offset: FixedOffset) -> Self {
        let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default();
        let date = utc.with_timezone(&offset).date_naive();
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn today(clock: &impl Clock) -> Self {
        Self::from_millis(clock.now_millis(), clock.offset())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn storage_key(&self) -> String {
        format!("{STORAGE_PREFIX}{}", self.0)
    }

    /// Inverse of [`DayKey::storage_key`]. Only checks the prefix, so keys
    /// written by other versions are still recognized for cleanup.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        key.strip_prefix(STORAGE_PREFIX)
            .filter(|day| !day.is_empty())
            .map(|day| Self(day.to_string()))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of wall-clock time for the ledger.
pub trait Clock {
    fn now_millis(&self) -> i64;

    /// UTC offset used to decide which calendar day `now_millis` falls on.
    fn offset(&self) -> FixedOffset;
}

/// System time with the local UTC offset captured once at construction, so
/// the day boundary stays put if the host timezone changes mid-session.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// and advance the clock a ledger owns.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
    offset: FixedOffset,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(now_millis)),
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn set(&self, now_millis: i64) {
        self.now.set(now_millis);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
