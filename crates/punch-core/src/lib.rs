//! Core domain logic for the punch time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: the `in`/`out` punch records and their text form
//! - Sessions: rebuilding work intervals from the event log
//! - Bucketing: slicing sessions by hour, workday and ISO week
//! - Reports: today's overview and bar charts over the history

pub mod aggregate;
pub mod bucket;
pub mod event;
pub mod event_type;
pub mod graph;
pub mod report;
pub mod session;
pub mod workday;

pub use aggregate::{WorkdayProgress, format_hours_minutes, workday_progress};
pub use event::{Event, ParseError, TIMESTAMP_FORMAT, format_timestamp, parse_line, parse_timestamp};
pub use event_type::{EventType, UnknownEventType};
pub use graph::{ChartError, render_bargraph};
pub use report::{Chart, History, Overview, ReportError};
pub use session::{Audit, MismatchedEntry, Policy, Session, audit, check_append, validate};
pub use workday::Workday;
