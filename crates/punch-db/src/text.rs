//! Plain-text timesheet store.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use fs2::FileExt;
use punch_core::{Event, EventType, parse_line};

use crate::{EventLog, LogError, Record, check_next};

/// An event log stored as one `<timestamp> <type>` line per event.
///
/// Blank lines and `#` comments are ignored by readers and preserved by
/// writers. A missing file is an empty log; it is created on first append.
#[derive(Debug, Clone)]
pub struct TextLog {
    path: PathBuf,
}

impl TextLog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<file><suffix>` next to the timesheet.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Takes the writer lock; released when the returned file is dropped.
    fn lock(&self) -> Result<File, LogError> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling(".lock"))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn read_contents(&self) -> Result<String, LogError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file with `contents` via a synced temp file and a rename.
    fn write_atomic(&self, contents: &str) -> Result<(), LogError> {
        let tmp_path = self.sibling(".tmp");
        let result =
            write_synced(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, &self.path));

        if let Err(e) = result {
            tracing::warn!(
                path = %tmp_path.display(),
                error = %e,
                "failed to replace timesheet"
            );
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn last_event(contents: &str) -> Option<Event> {
    contents
        .lines()
        .rev()
        .find_map(|line| parse_line(line).and_then(Result::ok))
}

impl EventLog for TextLog {
    fn append(&mut self, kind: EventType, timestamp: NaiveDateTime) -> Result<Event, LogError> {
        let _lock = self.lock()?;
        let contents = self.read_contents()?;
        let event = Event::new(kind, timestamp);
        check_next(last_event(&contents).as_ref(), &event)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&event.to_line());
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        tracing::debug!(path = %self.path.display(), line = %event.to_line(), "appended event");
        Ok(event)
    }

    fn delete_last(&mut self) -> Result<Option<Event>, LogError> {
        let _lock = self.lock()?;
        let contents = self.read_contents()?;
        let mut lines: Vec<&str> = contents.lines().collect();

        let Some((index, event)) = lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, line)| parse_line(line).and_then(Result::ok).map(|e| (i, e)))
        else {
            return Ok(None);
        };

        lines.remove(index);
        let rewritten: String = lines.iter().map(|line| format!("{line}\n")).collect();
        self.write_atomic(&rewritten)?;

        tracing::debug!(path = %self.path.display(), line = %event.to_line(), "deleted event");
        Ok(Some(event))
    }

    fn read_records(&self) -> Result<Vec<Record>, LogError> {
        let contents = self.read_contents()?;
        Ok(contents
            .lines()
            .enumerate()
            .filter_map(|(i, line)| parse_line(line).map(|record| (i + 1, record)))
            .collect())
    }

    fn replace_all(&mut self, events: &[Event]) -> Result<(), LogError> {
        let _lock = self.lock()?;
        let contents: String = events.iter().map(|e| format!("{}\n", e.to_line())).collect();
        self.write_atomic(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use punch_core::{Audit, ParseError};
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn log_with(dir: &TempDir, contents: &str) -> TextLog {
        let path = dir.path().join("timesheet");
        fs::write(&path, contents).unwrap();
        TextLog::open(path)
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = TextLog::open(dir.path().join("absent"));
        assert!(log.read_records().unwrap().is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let log = log_with(&dir, "# week 3\n\n2024/01/15 08h00 in\n");
        let records = log.read_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, 3);
    }

    #[test]
    fn malformed_lines_are_skipped_but_audited() {
        let dir = TempDir::new().unwrap();
        let log = log_with(
            &dir,
            "2024/01/15 08h00 in\nyesterday-ish out\n2024/01/15 12h00 out\n",
        );

        assert_eq!(log.read_all().unwrap().len(), 2);
        match log.audit().unwrap() {
            Audit::Malformed { line, error } => {
                assert_eq!(line, 2);
                assert!(matches!(error, ParseError::BadTimestamp { .. }));
            }
            other => panic!("expected malformed line, got {other:?}"),
        }
    }

    #[test]
    fn hand_edited_mismatch_is_audited() {
        let dir = TempDir::new().unwrap();
        let log = log_with(&dir, "2024/01/15 08h00 in\n2024/01/15 09h00 in\n");
        match log.audit().unwrap() {
            Audit::Mismatch { line, entry } => {
                assert_eq!(line, 2);
                assert_eq!(entry.timestamp, at(9, 0));
                assert_eq!(entry.expected, EventType::Out);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn delete_last_keeps_comments() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(
            &dir,
            "# monday\n2024/01/15 08h00 in\n2024/01/15 12h00 out\n# lunch\n",
        );

        let removed = log.delete_last().unwrap();
        assert_eq!(removed, Some(Event::new(EventType::Out, at(12, 0))));
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "# monday\n2024/01/15 08h00 in\n# lunch\n"
        );
    }

    #[test]
    fn append_after_missing_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, "2024/01/15 08h00 in");
        log.append(EventType::Out, at(12, 0)).unwrap();
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "2024/01/15 08h00 in\n2024/01/15 12h00 out\n"
        );
    }

    #[test]
    fn rewrite_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut log = log_with(&dir, "2024/01/15 08h00 in\n");
        log.delete_last().unwrap();

        assert!(!dir.path().join("timesheet.tmp").exists());
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "");
    }

    #[test]
    fn replace_all_writes_one_line_per_event() {
        let dir = TempDir::new().unwrap();
        let mut log = TextLog::open(dir.path().join("timesheet"));
        log.replace_all(&[
            Event::new(EventType::In, at(8, 0)),
            Event::new(EventType::Out, at(17, 5)),
        ])
        .unwrap();
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "2024/01/15 08h00 in\n2024/01/15 17h05 out\n"
        );
    }
}
