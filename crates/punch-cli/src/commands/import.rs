//! The `import` command: loads a JSON export into an empty timesheet.

use std::path::Path;

use anyhow::{Context, Result};
use punch_core::Event;
use punch_db::{EventLog, LogError};

use super::check;

/// Parses the JSON array written by `export`.
pub fn parse_events(json: &str) -> Result<Vec<Event>> {
    serde_json::from_str(json).context("invalid entry in JSON file")
}

pub fn run(log: &mut dyn EventLog, input: &Path) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("could not load {}", input.display()))?;
    let events = parse_events(&json)?;

    let audit = match punch_db::import(log, &events) {
        Ok(audit) => audit,
        Err(LogError::NotEmpty) => anyhow::bail!("timesheet already contains data"),
        Err(e) => return Err(e).context("failed to import entries"),
    };
    check::report(&audit)
}
