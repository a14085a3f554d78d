//! The default command: today's punches and progress towards the target.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use punch_core::report::{Overview, overview};
use punch_core::{Workday, format_hours_minutes};
use punch_db::EventLog;

const CLOCK_FORMAT: &str = "%Hh%M";

/// Formats today's sessions followed by the worked total and projected end.
pub fn format_overview(overview: &Overview, now: NaiveDateTime) -> String {
    let mut lines = vec![String::new()];
    for session in &overview.sessions {
        lines.push(format!("in    {}", session.start.format(CLOCK_FORMAT)));
        if let Some(end) = session.end {
            lines.push(format!(
                "out   {}   {}",
                end.format(CLOCK_FORMAT),
                format_hours_minutes(session.duration(now).num_seconds())
            ));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Worked today:     {} hours {} minutes",
        overview.progress.hours, overview.progress.minutes
    ));
    lines.push(format!(
        "End of work day:  {}",
        overview.progress.end_of_day.format(CLOCK_FORMAT)
    ));
    lines.push(String::new());
    lines.join("\n")
}

pub fn run(log: &dyn EventLog, workday: &Workday, now: NaiveDateTime) -> Result<()> {
    let (from, to) = workday.range_for(now);
    let events = log.read_range(from, to).context("failed to read timesheet")?;
    let overview = overview(&events, now, workday)
        .context("today's entries do not alternate; run 'punch check'")?;
    println!("{}", format_overview(&overview, now));
    Ok(())
}
