//! The `check` command: audits the whole timesheet.

use anyhow::{Context, Result};
use punch_core::{Audit, format_timestamp};
use punch_db::EventLog;

/// Describes the first problem found, or `None` for a clean log.
pub fn describe(audit: &Audit) -> Option<String> {
    match audit {
        Audit::Clean => None,
        Audit::Malformed { line, error } => Some(format!("Error in line {line}: {error}")),
        Audit::Mismatch { entry, .. } => Some(format!(
            "Error in entry {}: expected type '{}', got '{}'",
            format_timestamp(entry.timestamp),
            entry.expected,
            entry.actual
        )),
    }
}

/// Prints the audit result. Fails if the log has errors.
pub fn report(audit: &Audit) -> Result<()> {
    match describe(audit) {
        None => {
            println!("No errors");
            Ok(())
        }
        Some(problem) => {
            println!("{problem}");
            anyhow::bail!("timesheet has errors")
        }
    }
}

pub fn run(log: &dyn EventLog) -> Result<()> {
    let audit = log.audit().context("failed to read timesheet")?;
    report(&audit)
}
