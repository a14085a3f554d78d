//! The `in` and `out` commands.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use punch_core::{EventType, format_timestamp};
use punch_db::EventLog;

use super::util::parse_timestamp_arg;

/// Records a punch of `kind` at the time described by `timestamp` words.
pub fn run(
    log: &mut dyn EventLog,
    kind: EventType,
    timestamp: &[String],
    now: NaiveDateTime,
) -> Result<()> {
    let when = parse_timestamp_arg(&timestamp.join(" "), now)?;
    let event = log
        .append(kind, when)
        .with_context(|| format!("failed to add '{kind}' entry"))?;

    tracing::info!(
        kind = %event.kind,
        timestamp = %format_timestamp(event.timestamp),
        "recorded entry"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use punch_db::SqliteLog;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    #[test]
    fn records_time_of_day() {
        let mut log = SqliteLog::open_in_memory().unwrap();
        run(&mut log, EventType::In, &["08h00".to_string()], now()).unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(format_timestamp(events[0].timestamp), "2024/01/15 08h00");
    }

    #[test]
    fn defaults_to_now() {
        let mut log = SqliteLog::open_in_memory().unwrap();
        run(&mut log, EventType::In, &[], now()).unwrap();
        assert_eq!(log.read_all().unwrap()[0].timestamp, now());
    }

    #[test]
    fn mismatch_is_reported() {
        let mut log = SqliteLog::open_in_memory().unwrap();
        run(&mut log, EventType::In, &[], now()).unwrap();
        let err = run(&mut log, EventType::In, &[], now()).unwrap_err();

        assert_eq!(err.to_string(), "failed to add 'in' entry");
        assert_eq!(
            err.root_cause().to_string(),
            "mismatched entry at 2024/01/15 14h00: expected 'out', got 'in'"
        );
    }
}
