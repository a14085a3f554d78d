//! Workday boundaries.
//!
//! A workday starts at a configurable time of day rather than at midnight, so
//! a 03:00 punch still belongs to the previous evening's workday.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};

/// Workday settings threaded through every bucketing and reporting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workday {
    /// Time of day at which one workday ends and the next begins.
    pub start: NaiveTime,
    /// Target length of a workday in seconds.
    pub target_seconds: i64,
}

impl Default for Workday {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            target_seconds: 8 * 60 * 60,
        }
    }
}

impl Workday {
    /// Creates workday settings from a cutoff time and a target length.
    pub const fn new(start: NaiveTime, target_seconds: i64) -> Self {
        Self {
            start,
            target_seconds,
        }
    }

    /// Returns the start of the workday `timestamp` belongs to.
    ///
    /// Anything strictly before the cutoff belongs to the previous day's workday.
    pub fn start_for(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let same_day = timestamp.date().and_time(self.start);
        if timestamp.time() < self.start {
            same_day - Duration::days(1)
        } else {
            same_day
        }
    }

    /// Returns the half-open `[start, end)` range of the workday containing `timestamp`.
    pub fn range_for(&self, timestamp: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.start_for(timestamp);
        (start, start + Duration::days(1))
    }

    /// Weekday of the workday containing `timestamp`.
    pub fn weekday_for(&self, timestamp: NaiveDateTime) -> Weekday {
        self.start_for(timestamp).weekday()
    }
}
