//! SQLite-backed store.
//!
//! # Schema
//!
//! A single `events` table. `id` preserves append order; `timestamp` is text in
//! [`punch_core::TIMESTAMP_FORMAT`] and `type` is `in` or `out`. Ranged reads
//! compare timestamps as text, which matches chronological order.

use std::path::Path;

use chrono::NaiveDateTime;
use punch_core::{Event, EventType, ParseError, format_timestamp, parse_timestamp};
use rusqlite::{Connection, Row, params};

use crate::{EventLog, LogError, Record, check_next};

/// Event log in an SQLite database.
///
/// Every mutation runs in its own transaction, so a crash never leaves a
/// half-written event behind.
pub struct SqliteLog {
    conn: Connection,
}

impl SqliteLog {
    /// Opens a database at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let conn = Connection::open(path)?;
        let log = Self { conn };
        log.init()?;
        Ok(log)
    }

    /// Opens an in-memory database, destroyed when the log is dropped.
    pub fn open_in_memory() -> Result<Self, LogError> {
        let conn = Connection::open_in_memory()?;
        let log = Self { conn };
        log.init()?;
        Ok(log)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), LogError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                type TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
            ",
        )?;
        Ok(())
    }
}

/// Parses one `(id, timestamp, type)` row.
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, Result<Event, ParseError>)> {
    let id: i64 = row.get(0)?;
    let timestamp: String = row.get(1)?;
    let kind: String = row.get(2)?;
    Ok((id, parse_record(&timestamp, &kind)))
}

fn parse_record(timestamp: &str, kind: &str) -> Result<Event, ParseError> {
    let kind: EventType = kind.parse()?;
    Ok(Event::new(kind, parse_timestamp(timestamp)?))
}

/// Most recent parseable row in append order, with its id.
///
/// Malformed rows are skipped so a bad row never blocks `undo` or `in`/`out`;
/// `audit` still reports it.
fn last_row(conn: &Connection) -> Result<Option<(i64, Event)>, LogError> {
    let mut stmt = conn.prepare("SELECT id, timestamp, type FROM events ORDER BY id DESC")?;
    let rows = stmt.query_map([], record_from_row)?;
    for row in rows {
        if let (id, Ok(event)) = row? {
            return Ok(Some((id, event)));
        }
    }
    Ok(None)
}

fn insert(conn: &Connection, event: &Event) -> Result<(), LogError> {
    conn.execute(
        "INSERT INTO events (timestamp, type) VALUES (?1, ?2)",
        params![format_timestamp(event.timestamp), event.kind.as_str()],
    )?;
    Ok(())
}

impl EventLog for SqliteLog {
    fn append(&mut self, kind: EventType, timestamp: NaiveDateTime) -> Result<Event, LogError> {
        let event = Event::new(kind, timestamp);
        let tx = self.conn.transaction()?;
        let latest = last_row(&tx)?.map(|(_, e)| e);
        check_next(latest.as_ref(), &event)?;
        insert(&tx, &event)?;
        tx.commit()?;

        tracing::debug!(line = %event.to_line(), "appended event");
        Ok(event)
    }

    fn delete_last(&mut self) -> Result<Option<Event>, LogError> {
        let tx = self.conn.transaction()?;
        let Some((id, event)) = last_row(&tx)? else {
            return Ok(None);
        };
        tx.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!(id, line = %event.to_line(), "deleted event");
        Ok(Some(event))
    }

    fn read_records(&self) -> Result<Vec<Record>, LogError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, timestamp, type FROM events ORDER BY id ASC")?;
        let rows = stmt.query_map([], record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            let (id, record) = row?;
            records.push((usize::try_from(id).unwrap_or_default(), record));
        }
        Ok(records)
    }

    fn read_range(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Event>, LogError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp, type
            FROM events
            WHERE timestamp >= ?1 AND timestamp < ?2
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![format_timestamp(from), format_timestamp(to)],
            record_from_row,
        )?;
        let mut events = Vec::new();
        for row in rows {
            if let (_, Ok(event)) = row? {
                events.push(event);
            }
        }
        Ok(events)
    }

    fn replace_all(&mut self, events: &[Event]) -> Result<(), LogError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM events", [])?;
        for event in events {
            insert(&tx, event)?;
        }
        tx.commit()?;
        Ok(())
    }
}
