//! The `export` command: writes the timesheet as a JSON array.
//!
//! Each record is `{"timestamp": "2024/01/15 08h00", "type": "in"}`, the same
//! shape `import` reads back.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use punch_core::Event;
use punch_db::{EventLog, Record};

/// Serializes events as pretty-printed JSON.
pub fn to_json(events: &[Event]) -> Result<String> {
    serde_json::to_string_pretty(events).context("failed to serialize events")
}

/// Keeps readable records in stored order, warning about each one dropped.
///
/// Returns the events and how many records were skipped.
pub fn readable_events(records: Vec<Record>) -> (Vec<Event>, usize) {
    let mut events = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (line, record) in records {
        match record {
            Ok(event) => events.push(event),
            Err(error) => {
                tracing::warn!(line, %error, "skipping unreadable entry");
                skipped += 1;
            }
        }
    }
    (events, skipped)
}

pub fn run(log: &dyn EventLog, output: &Path) -> Result<()> {
    let records = log.read_records().context("failed to read timesheet")?;
    let (events, skipped) = readable_events(records);
    if skipped > 0 {
        eprintln!("Warning: skipped {skipped} unreadable entries; run 'punch check' for details");
    }
    let json = to_json(&events)?;

    // `create_new` refuses to clobber an existing file.
    let mut file = match OpenOptions::new().write(true).create_new(true).open(output) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            anyhow::bail!("{} already exists", output.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create {}", output.display()));
        }
    };
    file.write_all(json.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(count = events.len(), path = %output.display(), "exported events");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use punch_core::EventType;
    use punch_db::SqliteLog;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn json_uses_timesheet_format() {
        let events = [
            Event::new(EventType::In, at(8, 0)),
            Event::new(EventType::Out, at(12, 30)),
        ];
        assert_snapshot!(to_json(&events).unwrap(), @r#"
        [
          {
            "timestamp": "2024/01/15 08h00",
            "type": "in"
          },
          {
            "timestamp": "2024/01/15 12h30",
            "type": "out"
          }
        ]
        "#);
    }

    #[test]
    fn unreadable_records_are_counted_not_exported() {
        let bad = punch_core::parse_line("2024/01/15 09h00 lunch").unwrap();
        let records = vec![
            (1, Ok(Event::new(EventType::In, at(8, 0)))),
            (2, bad),
            (3, Ok(Event::new(EventType::Out, at(12, 0)))),
        ];
        let (events, skipped) = readable_events(records);

        assert_eq!(skipped, 1);
        assert_eq!(
            events,
            vec![
                Event::new(EventType::In, at(8, 0)),
                Event::new(EventType::Out, at(12, 0)),
            ]
        );
    }

    #[test]
    fn refuses_existing_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.json");
        std::fs::write(&output, "keep me").unwrap();

        let log = SqliteLog::open_in_memory().unwrap();
        let err = run(&log, &output).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
    }
}
