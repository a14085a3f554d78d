//! Session reconstruction from the in/out event log.
//!
//! # Algorithm Summary
//!
//! Events are consumed in ascending timestamp order while tracking the start of
//! the pending (clocked-in) session:
//!
//! 1. `In` with nothing pending opens a session; `In` while pending is a mismatch.
//! 2. `Out` closes the pending session. An `Out` that is the first event of the
//!    range means the range began mid-session, so the session is synthesized
//!    from the start of that event's workday. Any other unmatched `Out` is a
//!    mismatch.
//! 3. A session still pending at the end is emitted open (`end = None`).
//!
//! The same alternation rule backs [`check_append`] (write-time validation) and
//! [`audit`] (read-time integrity check of a whole log).

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::bucket::Interval;
use crate::event::{Event, ParseError, format_timestamp};
use crate::event_type::EventType;
use crate::workday::Workday;

/// One contiguous in→out work interval. `end = None` means still clocked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl Session {
    pub const fn closed(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub const fn open(start: NaiveDateTime) -> Self {
        Self { start, end: None }
    }

    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// End of the session, using `now` for an open session.
    ///
    /// Never earlier than the start, even if `now` is.
    pub fn end_or(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.end.unwrap_or(now).max(self.start)
    }

    /// Worked time, counting an open session up to `now`.
    pub fn duration(&self, now: NaiveDateTime) -> Duration {
        self.end_or(now) - self.start
    }

    /// The session as a closed interval, resolving an open end to `now`.
    pub fn interval(&self, now: NaiveDateTime) -> Interval {
        Interval::new(self.start, self.end_or(now))
    }
}

/// Two consecutive events of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "mismatched entry at {}: expected '{expected}', got '{actual}'",
    format_timestamp(*timestamp)
)]
pub struct MismatchedEntry {
    pub timestamp: NaiveDateTime,
    pub expected: EventType,
    pub actual: EventType,
}

/// What to do when the event sequence does not alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Fail with [`MismatchedEntry`].
    #[default]
    Strict,
    /// Skip the offending event and carry on.
    Lenient,
}

/// Rebuilds sessions from events, sorting them by timestamp first.
pub fn reconstruct(
    events: &[Event],
    workday: &Workday,
    policy: Policy,
) -> Result<Vec<Session>, MismatchedEntry> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.timestamp);

    let mut sessions = Vec::new();
    let mut pending: Option<NaiveDateTime> = None;
    let mut seen_any = false;

    for event in &sorted {
        match event.kind {
            EventType::In => {
                if pending.is_some() {
                    mismatch(policy, event, EventType::Out)?;
                } else {
                    pending = Some(event.timestamp);
                }
            }
            EventType::Out => match pending.take() {
                Some(start) => sessions.push(Session::closed(start, event.timestamp)),
                None if !seen_any => {
                    let start = workday.start_for(event.timestamp);
                    sessions.push(Session::closed(start, event.timestamp));
                }
                None => mismatch(policy, event, EventType::In)?,
            },
        }
        seen_any = true;
    }

    if let Some(start) = pending {
        sessions.push(Session::open(start));
    }

    Ok(sessions)
}

fn mismatch(policy: Policy, event: &Event, expected: EventType) -> Result<(), MismatchedEntry> {
    let entry = MismatchedEntry {
        timestamp: event.timestamp,
        expected,
        actual: event.kind,
    };
    match policy {
        Policy::Strict => Err(entry),
        Policy::Lenient => {
            tracing::warn!(%entry, "skipping event that breaks in/out alternation");
            Ok(())
        }
    }
}

/// Rebuilds the sessions whose events fall in `[from, from + duration)`.
///
/// A session synthesized for a leading `Out` never starts before `from`.
pub fn sessions_in_range(
    events: &[Event],
    from: NaiveDateTime,
    duration: Duration,
    workday: &Workday,
    policy: Policy,
) -> Result<Vec<Session>, MismatchedEntry> {
    let to = from + duration;
    let in_range: Vec<Event> = events
        .iter()
        .filter(|e| e.timestamp >= from && e.timestamp < to)
        .copied()
        .collect();

    let mut sessions = reconstruct(&in_range, workday, policy)?;
    for session in &mut sessions {
        session.start = session.start.max(from);
    }
    Ok(sessions)
}

/// Checks that appending `next` after `previous` keeps the log alternating.
///
/// An empty log only accepts `In`.
pub fn check_append(previous: Option<&Event>, next: &Event) -> Result<(), MismatchedEntry> {
    let expected = previous.map_or(EventType::In, |p| p.kind.opposite());
    if next.kind == expected {
        Ok(())
    } else {
        Err(MismatchedEntry {
            timestamp: next.timestamp,
            expected,
            actual: next.kind,
        })
    }
}

/// Outcome of a full-log integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audit {
    /// Strict `in, out, in, out, ...` alternation throughout.
    Clean,
    /// A record that could not be parsed.
    Malformed { line: usize, error: ParseError },
    /// The first record that breaks alternation.
    Mismatch { line: usize, entry: MismatchedEntry },
}

impl Audit {
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Scans stored records from the beginning and reports the first problem.
///
/// Records are `(line or row number, parse result)` in stored order.
pub fn audit<I>(records: I) -> Audit
where
    I: IntoIterator<Item = (usize, Result<Event, ParseError>)>,
{
    let mut previous: Option<Event> = None;
    for (line, record) in records {
        let event = match record {
            Ok(event) => event,
            Err(error) => return Audit::Malformed { line, error },
        };
        if let Err(entry) = check_append(previous.as_ref(), &event) {
            return Audit::Mismatch { line, entry };
        }
        previous = Some(event);
    }
    Audit::Clean
}

/// Checks alternation over already-parsed events in stored order.
pub fn validate(events: &[Event]) -> Result<(), MismatchedEntry> {
    let mut previous: Option<&Event> = None;
    for event in events {
        check_append(previous, event)?;
        previous = Some(event);
    }
    Ok(())
}
