//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use punch_core::parse_timestamp;
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (one year in minutes).
const MAX_RELATIVE_MINUTES: i64 = 365 * 24 * 60;

/// Parses a punch timestamp argument relative to `now`.
///
/// Supports:
/// - empty: `now`
/// - time of day today: "08h30", "08:30"
/// - full timestamp: "2024/01/15 08h30"
/// - relative: "5 minutes ago", "1 hour ago"
pub fn parse_timestamp_arg(s: &str, now: NaiveDateTime) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(now);
    }

    for format in ["%Hh%M", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(s, format) {
            return Ok(now.date().and_time(time));
        }
    }

    if let Ok(timestamp) = parse_timestamp(s) {
        return Ok(timestamp);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid timestamp: {s}. Use HHhMM, HH:MM, YYYY/MM/DD HHhMM or relative (e.g., '5 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 7, 31)
            .unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn empty_means_now() {
        assert_eq!(parse_timestamp_arg("", now()).unwrap(), now());
    }

    #[test]
    fn time_of_day_formats() {
        assert_eq!(parse_timestamp_arg("08h30", now()).unwrap(), at(8, 30));
        assert_eq!(parse_timestamp_arg("8:05", now()).unwrap(), at(8, 5));
    }

    #[test]
    fn full_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(
            parse_timestamp_arg("2023/12/31 23h59", now()).unwrap(),
            expected
        );
    }

    #[test]
    fn relative_minutes_and_hours() {
        assert_eq!(
            parse_timestamp_arg("5 minutes ago", now()).unwrap(),
            now() - Duration::minutes(5)
        );
        assert_eq!(
            parse_timestamp_arg("1 hour ago", now()).unwrap(),
            now() - Duration::hours(1)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp_arg("lunchtime", now()).is_err());
        assert!(parse_timestamp_arg("25h00", now()).is_err());
        assert!(parse_timestamp_arg("3 days ago", now()).is_err());
    }

    #[test]
    fn rejects_huge_relative_values() {
        let err = parse_timestamp_arg("99999999 hours ago", now()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
