//! Punch clock events and their one-line text form.
//!
//! Each event is stored as `<timestamp> <type>` where the timestamp uses
//! [`TIMESTAMP_FORMAT`] (local wall-clock time, minute precision) and the type
//! is literally `in` or `out`. Lines starting with `#` are comments.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event_type::{EventType, UnknownEventType};

/// Sortable textual timestamp format shared by every store and by import/export.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %Hh%M";

/// A single clock-in or clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Local wall-clock time of the event.
    #[serde(with = "timestamp_serde")]
    pub timestamp: NaiveDateTime,
    /// Whether the user clocked in or out.
    #[serde(rename = "type")]
    pub kind: EventType,
}

impl Event {
    /// Creates an event, truncating the timestamp to the persisted minute precision.
    pub fn new(kind: EventType, timestamp: NaiveDateTime) -> Self {
        Self {
            kind,
            timestamp: truncate_to_minute(timestamp),
        }
    }

    /// Renders the event as a timesheet line (without the trailing newline).
    pub fn to_line(&self) -> String {
        format!("{} {}", format_timestamp(self.timestamp), self.kind)
    }
}

/// Why a timesheet line could not be turned into an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line has no `in`/`out` suffix at all.
    #[error("missing event type in '{0}'")]
    MissingType(String),
    /// The suffix is not `in` or `out`.
    #[error(transparent)]
    UnknownType(#[from] UnknownEventType),
    /// The timestamp does not match [`TIMESTAMP_FORMAT`].
    #[error("invalid timestamp '{value}': {source}")]
    BadTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parses one timesheet line.
///
/// Returns `None` for blank lines and `#` comments, so permissive readers can
/// skip errors while strict validators report them from the same primitive.
pub fn parse_line(line: &str) -> Option<Result<Event, ParseError>> {
    let line = line.trim_end_matches(['\r', '\n']).trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let Some((timestamp, kind)) = line.rsplit_once(' ') else {
        return Some(Err(ParseError::MissingType(line.to_string())));
    };

    Some(parse_parts(timestamp, kind))
}

fn parse_parts(timestamp: &str, kind: &str) -> Result<Event, ParseError> {
    let kind: EventType = kind.parse()?;
    let timestamp = parse_timestamp(timestamp)?;
    Ok(Event::new(kind, timestamp))
}

/// Parses a timestamp written in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|source| {
        ParseError::BadTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Formats a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Drops seconds and sub-seconds.
pub fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

mod timestamp_serde {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn parses_well_formed_line() {
        let event = parse_line("2024/01/15 08h00 in").unwrap().unwrap();
        assert_eq!(event, Event::new(EventType::In, at(8, 0)));
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let event = parse_line("2024/01/15 12h30 out\r\n").unwrap().unwrap();
        assert_eq!(event, Event::new(EventType::Out, at(12, 30)));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert!(parse_line("# started new job").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn unknown_type_is_reported() {
        let err = parse_line("2024/01/15 08h00 lunch").unwrap().unwrap_err();
        assert!(matches!(err, ParseError::UnknownType(_)));
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let err = parse_line("2024-01-15 08:00 in").unwrap().unwrap_err();
        assert!(matches!(err, ParseError::BadTimestamp { .. }));
    }

    #[test]
    fn missing_type_is_reported() {
        let err = parse_line("garbage").unwrap().unwrap_err();
        assert_eq!(err, ParseError::MissingType("garbage".to_string()));
    }

    #[test]
    fn to_line_matches_parse_line() {
        let event = Event::new(EventType::Out, at(17, 5));
        assert_eq!(event.to_line(), "2024/01/15 17h05 out");
        assert_eq!(parse_line(&event.to_line()).unwrap().unwrap(), event);
    }

    #[test]
    fn new_truncates_seconds() {
        let ts = at(9, 41).with_second(37).unwrap();
        assert_eq!(Event::new(EventType::In, ts).timestamp, at(9, 41));
    }
}
