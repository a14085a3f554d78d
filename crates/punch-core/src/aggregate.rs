//! Scalar summaries over bucketed history.

use chrono::{Duration, NaiveDateTime};

use crate::bucket::Slice;

/// Sums the daily slices whose reference lies in `[from, to)`.
pub fn total_duration_in_range(daily: &[Slice], from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    daily
        .iter()
        .filter(|s| s.reference >= from && s.reference < to)
        .map(|s| s.seconds)
        .sum()
}

/// Time worked so far today and when the target will be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkdayProgress {
    pub hours: i64,
    pub minutes: i64,
    /// `now` plus the time still missing to reach the target. In the past once
    /// the target is exceeded.
    pub end_of_day: NaiveDateTime,
}

/// Splits `total_seconds` into whole hours and minutes and projects the end of
/// the workday.
pub fn workday_progress(
    total_seconds: i64,
    target_seconds: i64,
    now: NaiveDateTime,
) -> WorkdayProgress {
    WorkdayProgress {
        hours: total_seconds.div_euclid(3600),
        minutes: total_seconds.div_euclid(60).rem_euclid(60),
        end_of_day: now + Duration::seconds(target_seconds - total_seconds),
    }
}

/// Arithmetic mean, `0.0` for no values.
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

/// Formats seconds as `Xh Ym`, flooring to whole minutes.
pub fn format_hours_minutes(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}h {}m", seconds / 3600, (seconds / 60) % 60)
}
