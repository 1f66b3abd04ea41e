//! Civil wall-clock abstraction.
//!
//! All "today" calculations go through a [`Clock`], which yields local civil
//! time in a fixed UTC offset. Timestamps stored by the write paths are
//! produced by the same clock, so calendar-day bucketing in the store lines
//! up with the engine's notion of "today".

use std::ops::RangeInclusive;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};

/// Default civil offset (UTC+3).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;

/// Whole-hour offsets in use by civil time zones.
pub const UTC_OFFSET_HOURS_RANGE: RangeInclusive<i32> = -12..=14;

/// Source of the current local civil date and time.
pub trait Clock: Send + Sync {
    /// Current local civil date-time (no zone attached).
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current local time of day as `HH:MM`.
    fn time_of_day(&self) -> String {
        self.now().format("%H:%M").to_string()
    }
}

/// System clock shifted to a fixed civil UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    /// Create a clock for the given whole-hour UTC offset.
    ///
    /// Returns `None` outside [`UTC_OFFSET_HOURS_RANGE`].
    pub fn with_offset_hours(hours: i32) -> Option<Self> {
        if !UTC_OFFSET_HOURS_RANGE.contains(&hours) {
            return None;
        }
        FixedOffset::east_opt(hours * 3600).map(|offset| Self { offset })
    }

    /// Offset from UTC in seconds.
    pub fn offset_seconds(&self) -> i32 {
        self.offset.local_minus_utc()
    }
}

impl Default for CivilClock {
    fn default() -> Self {
        Self::with_offset_hours(DEFAULT_UTC_OFFSET_HOURS).unwrap_or(Self { offset: Utc.fix() })
    }
}

impl Clock for CivilClock {
    fn now(&self) -> NaiveDateTime {
        let local = Utc::now().with_timezone(&self.offset).naive_local();
        // Second precision keeps stored timestamps uniform.
        local.with_nanosecond(0).unwrap_or(local)
    }
}

/// Clock frozen at a single instant. Used by tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
