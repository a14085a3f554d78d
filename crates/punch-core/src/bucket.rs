//! Time bucketing: slicing intervals onto hour and workday boundaries.
//!
//! All functions are pure. Ranges are half-open (`[reference, reference + span)`),
//! so an interval ending exactly on a boundary contributes nothing to the next
//! bucket.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, IsoWeek, NaiveDateTime, Timelike};

use crate::session::Session;
use crate::workday::Workday;

/// A closed `[start, end)` span of worked time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// Worked seconds attributed to one calendar unit (an hour or a workday).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    /// Start of the unit the time is attributed to.
    pub reference: NaiveDateTime,
    pub seconds: i64,
}

impl Slice {
    pub const fn new(reference: NaiveDateTime, seconds: i64) -> Self {
        Self { reference, seconds }
    }
}

/// Truncates a timestamp to the start of its hour.
pub fn floor_hour(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

/// Splits an interval into one slice per calendar hour it overlaps.
///
/// Each slice is anchored at the start of its hour and carries only the
/// overlap, so the first and last slices may be partial.
pub fn slice_by_hour(interval: Interval) -> Vec<Slice> {
    let mut slices = Vec::new();
    let mut hour = floor_hour(interval.start);

    while hour < interval.end {
        let next = hour + Duration::hours(1);
        let overlap = interval.end.min(next) - interval.start.max(hour);
        if overlap > Duration::zero() {
            slices.push(Slice::new(hour, overlap.num_seconds()));
        }
        hour = next;
    }

    slices
}

/// Slices every session by hour, resolving open sessions to `now`.
pub fn slice_sessions_by_hour(sessions: &[Session], now: NaiveDateTime) -> Vec<Slice> {
    sessions
        .iter()
        .flat_map(|s| slice_by_hour(s.interval(now)))
        .collect()
}

/// Merges slices that share the same clock hour on the same day.
pub fn consolidate_by_hour(slices: &[Slice]) -> Vec<Slice> {
    consolidate(slices, floor_hour)
}

/// Re-anchors slices at the start of their workday and sums them per workday.
pub fn consolidate_by_day(slices: &[Slice], workday: &Workday) -> Vec<Slice> {
    consolidate(slices, |reference| workday.start_for(reference))
}

fn consolidate(slices: &[Slice], key: impl Fn(NaiveDateTime) -> NaiveDateTime) -> Vec<Slice> {
    let mut totals: BTreeMap<NaiveDateTime, i64> = BTreeMap::new();
    for slice in slices {
        *totals.entry(key(slice.reference)).or_default() += slice.seconds;
    }
    totals
        .into_iter()
        .map(|(reference, seconds)| Slice::new(reference, seconds))
        .collect()
}

/// Durations observed for each hour of the day (index 0-23), across all days.
///
/// Feed hour-consolidated slices to get one entry per day the hour was worked.
pub fn group_by_hour_of_day(slices: &[Slice]) -> [Vec<i64>; 24] {
    let mut hours: [Vec<i64>; 24] = std::array::from_fn(|_| Vec::new());
    for slice in slices {
        hours[slice.reference.hour() as usize].push(slice.seconds);
    }
    hours
}

/// Durations observed for each weekday (0 = Monday).
///
/// Slices before the workday cutoff count towards the previous weekday. Feed
/// day-consolidated slices to get one entry per workday.
pub fn group_by_weekday(slices: &[Slice], workday: &Workday) -> [Vec<i64>; 7] {
    let mut days: [Vec<i64>; 7] = std::array::from_fn(|_| Vec::new());
    for slice in slices {
        let weekday = workday.weekday_for(slice.reference);
        days[weekday.num_days_from_monday() as usize].push(slice.seconds);
    }
    days
}

/// Accumulated time for one ISO week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekBucket {
    pub seconds: i64,
    /// Working weekdays (0 = Monday through 4 = Friday) with any activity.
    pub weekdays: BTreeSet<u32>,
}

impl WeekBucket {
    /// Number of distinct days worked, for per-day averages over partial weeks.
    pub fn active_days(&self) -> usize {
        self.weekdays.len()
    }
}

/// Groups day-consolidated slices by ISO week.
///
/// Weekend time adds to the week's total but not to its active days.
pub fn group_by_week(slices: &[Slice], workday: &Workday) -> BTreeMap<IsoWeek, WeekBucket> {
    let mut weeks: BTreeMap<IsoWeek, WeekBucket> = BTreeMap::new();
    for slice in slices {
        let day = workday.start_for(slice.reference);
        let bucket = weeks.entry(day.iso_week()).or_default();
        bucket.seconds += slice.seconds;
        let weekday = day.weekday().num_days_from_monday();
        if slice.seconds > 0 && weekday < 5 {
            bucket.weekdays.insert(weekday);
        }
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn slices_partial_first_and_last_hours() {
        let slices = slice_by_hour(Interval::new(at(15, 8, 30), at(15, 10, 15)));
        assert_eq!(
            slices,
            vec![
                Slice::new(at(15, 8, 0), 1800),
                Slice::new(at(15, 9, 0), 3600),
                Slice::new(at(15, 10, 0), 900),
            ]
        );
    }

    #[test]
    fn slicing_is_lossless_across_days() {
        let interval = Interval::new(at(15, 22, 17), at(17, 3, 41));
        let total: i64 = slice_by_hour(interval).iter().map(|s| s.seconds).sum();
        assert_eq!(total, interval.seconds());
    }

    #[test]
    fn end_on_hour_boundary_belongs_to_preceding_slice() {
        let slices = slice_by_hour(Interval::new(at(15, 9, 0), at(15, 11, 0)));
        assert_eq!(
            slices,
            vec![
                Slice::new(at(15, 9, 0), 3600),
                Slice::new(at(15, 10, 0), 3600),
            ]
        );
    }

    #[test]
    fn empty_interval_has_no_slices() {
        assert!(slice_by_hour(Interval::new(at(15, 9, 30), at(15, 9, 30))).is_empty());
    }

    #[test]
    fn consolidate_by_hour_merges_same_hour_same_day() {
        let slices = [
            Slice::new(at(15, 9, 0), 600),
            Slice::new(at(15, 9, 0), 1200),
            Slice::new(at(16, 9, 0), 300),
        ];
        assert_eq!(
            consolidate_by_hour(&slices),
            vec![Slice::new(at(15, 9, 0), 1800), Slice::new(at(16, 9, 0), 300)]
        );
    }

    #[test]
    fn consolidate_by_day_uses_workday_cutoff() {
        let workday = Workday::default();
        let slices = [
            Slice::new(at(15, 5, 0), 3600),
            Slice::new(at(15, 6, 0), 3600),
            Slice::new(at(15, 23, 0), 3600),
            Slice::new(at(16, 2, 0), 1800),
        ];
        assert_eq!(
            consolidate_by_day(&slices, &workday),
            vec![
                Slice::new(at(14, 6, 0), 3600),
                Slice::new(at(15, 6, 0), 9000),
            ]
        );
    }

    #[test]
    fn group_by_hour_of_day_collects_per_day_values() {
        let slices = [
            Slice::new(at(15, 9, 0), 1800),
            Slice::new(at(16, 9, 0), 3600),
            Slice::new(at(16, 14, 0), 60),
        ];
        let hours = group_by_hour_of_day(&slices);
        assert_eq!(hours[9], vec![1800, 3600]);
        assert_eq!(hours[14], vec![60]);
        assert!(hours[0].is_empty());
    }

    #[test]
    fn group_by_weekday_shifts_early_morning() {
        let workday = Workday::default();
        // 2024-01-16 is a Tuesday; 03:00 belongs to Monday's workday.
        let slices = [
            Slice::new(at(16, 3, 0), 100),
            Slice::new(at(16, 6, 0), 200),
        ];
        let days = group_by_weekday(&slices, &workday);
        assert_eq!(days[0], vec![100]);
        assert_eq!(days[1], vec![200]);
    }

    #[test]
    fn group_by_week_counts_distinct_weekdays() {
        let workday = Workday::default();
        // Monday 2024-01-15 (two sessions) and Wednesday 2024-01-17.
        let sessions = [
            Session::closed(at(15, 8, 0), at(15, 12, 0)),
            Session::closed(at(15, 13, 0), at(15, 17, 0)),
            Session::closed(at(17, 9, 0), at(17, 10, 0)),
        ];
        let slices = slice_sessions_by_hour(&sessions, at(18, 0, 0));
        let daily = consolidate_by_day(&slices, &workday);
        let weeks = group_by_week(&daily, &workday);

        assert_eq!(weeks.len(), 1);
        let bucket = weeks.values().next().unwrap();
        assert_eq!(bucket.active_days(), 2);
        assert_eq!(bucket.seconds, 9 * 3600);
        assert_eq!(weeks.keys().next().unwrap().week(), 3);
    }

    #[test]
    fn group_by_week_ignores_weekend_days() {
        let workday = Workday::default();
        // Monday 2024-01-15, Saturday 01-20 and Sunday 01-21.
        let slices = [
            Slice::new(at(15, 6, 0), 3600),
            Slice::new(at(20, 6, 0), 1800),
            Slice::new(at(21, 6, 0), 1800),
        ];
        let weeks = group_by_week(&slices, &workday);

        assert_eq!(weeks.len(), 1);
        let bucket = weeks.values().next().unwrap();
        assert_eq!(bucket.active_days(), 1);
        assert_eq!(bucket.seconds, 2 * 3600);
    }

    #[test]
    fn group_by_week_separates_years() {
        let workday = Workday::default();
        let late = NaiveDate::from_ymd_opt(2023, 1, 16)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let slices = [Slice::new(late, 60), Slice::new(at(15, 6, 0), 60)];
        assert_eq!(group_by_week(&slices, &workday).len(), 2);
    }
}
