//! The `undo` command.

use anyhow::{Context, Result};
use punch_db::EventLog;

pub fn run(log: &mut dyn EventLog) -> Result<()> {
    match log.delete_last().context("failed to undo last entry")? {
        Some(event) => println!("Removed: {}", event.to_line()),
        None => println!("Nothing to undo"),
    }
    Ok(())
}
