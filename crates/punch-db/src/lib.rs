//! Storage layer for the punch time tracker.
//!
//! The event log is the only stateful component. Two stores implement
//! [`EventLog`]:
//!
//! - [`TextLog`]: one `<timestamp> <type>` line per event, hand-editable.
//! - [`SqliteLog`]: an `events` table in an SQLite database.
//!
//! Use [`open_log`] to pick the store from the file extension.
//!
//! # Write discipline
//!
//! Every append is checked against the most recent stored event before it is
//! written: it must not be older ([`LogError::OutOfOrder`]) and it must keep
//! the `in, out, in, out, ...` alternation ([`LogError::Mismatch`]). A log
//! produced solely through [`EventLog::append`] therefore always audits clean.
//! [`EventLog::delete_last`] is a plain undo and does not re-validate.
//!
//! # Timestamp Format
//!
//! Both stores persist timestamps as text in [`punch_core::TIMESTAMP_FORMAT`]
//! (`2024/01/15 08h00`), which sorts lexicographically in chronological order.

use std::path::Path;

use chrono::NaiveDateTime;
use punch_core::{
    Audit, Event, EventType, MismatchedEntry, ParseError, audit, check_append, format_timestamp,
};
use thiserror::Error;

mod sqlite;
mod text;

pub use sqlite::SqliteLog;
pub use text::TextLog;

/// Event log errors.
#[derive(Debug, Error)]
pub enum LogError {
    /// The backing file could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The append would break in/out alternation.
    #[error(transparent)]
    Mismatch(#[from] MismatchedEntry),
    /// The append is older than the most recent stored event.
    #[error(
        "event at {} is older than the latest event at {}",
        format_timestamp(*timestamp),
        format_timestamp(*latest)
    )]
    OutOfOrder {
        timestamp: NaiveDateTime,
        latest: NaiveDateTime,
    },
    /// Import refused because the destination already holds events.
    #[error("event log already contains data")]
    NotEmpty,
}

/// A stored record: its line (or row) number and the parse result.
pub type Record = (usize, Result<Event, ParseError>);

/// Durable, ordered storage for punch events.
pub trait EventLog {
    /// Records a new event after validating it against the most recent one.
    ///
    /// The timestamp is truncated to the minute. Returns the stored event.
    fn append(&mut self, kind: EventType, timestamp: NaiveDateTime) -> Result<Event, LogError>;

    /// Removes the most recent event, returning it. A no-op on an empty log.
    fn delete_last(&mut self) -> Result<Option<Event>, LogError>;

    /// Every stored record in stored order, including unparseable ones.
    fn read_records(&self) -> Result<Vec<Record>, LogError>;

    /// Replaces the whole log with `events`, atomically.
    fn replace_all(&mut self, events: &[Event]) -> Result<(), LogError>;

    /// All parseable events, ascending by timestamp.
    ///
    /// Malformed records are skipped; use [`EventLog::read_records`] to see them.
    fn read_all(&self) -> Result<Vec<Event>, LogError> {
        let mut events: Vec<Event> = self
            .read_records()?
            .into_iter()
            .filter_map(|(_, record)| record.ok())
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    /// Events in `[from, to)`, ascending by timestamp.
    fn read_range(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Event>, LogError> {
        let mut events = self.read_all()?;
        events.retain(|e| e.timestamp >= from && e.timestamp < to);
        Ok(events)
    }

    /// Scans the whole log for malformed records and alternation breaks.
    fn audit(&self) -> Result<Audit, LogError> {
        Ok(audit(self.read_records()?))
    }
}

/// Whether `path` names an SQLite database (`.db`, `.sqlite`, `.sqlite3`).
pub fn is_sqlite_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "db" | "sqlite" | "sqlite3"))
}

/// Opens the store matching the file extension: see [`is_sqlite_path`].
/// Anything that is not an SQLite database is a text timesheet.
pub fn open_log(path: &Path) -> Result<Box<dyn EventLog>, LogError> {
    if is_sqlite_path(path) {
        tracing::debug!(path = %path.display(), "opening sqlite event log");
        Ok(Box::new(SqliteLog::open(path)?))
    } else {
        tracing::debug!(path = %path.display(), "opening text event log");
        Ok(Box::new(TextLog::open(path)))
    }
}

/// Loads `events` into an empty log and audits the result.
///
/// Refuses with [`LogError::NotEmpty`] if the log already holds any record.
pub fn import(log: &mut dyn EventLog, events: &[Event]) -> Result<Audit, LogError> {
    if !log.read_records()?.is_empty() {
        return Err(LogError::NotEmpty);
    }
    log.replace_all(events)?;
    tracing::info!(count = events.len(), "imported events");
    log.audit()
}

/// Checks that `event` may follow `latest` in the log.
fn check_next(latest: Option<&Event>, event: &Event) -> Result<(), LogError> {
    if let Some(latest) = latest.filter(|l| event.timestamp < l.timestamp) {
        return Err(LogError::OutOfOrder {
            timestamp: event.timestamp,
            latest: latest.timestamp,
        });
    }
    check_append(latest, event)?;
    Ok(())
}
