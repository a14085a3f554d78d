//! Chart and total reports over the whole timesheet.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use punch_core::report::{
    Chart, History, ReportError, daily_chart, hourly_chart, recent_history_chart, total_hours,
    weekly_chart,
};
use punch_core::Workday;
use punch_db::EventLog;

use crate::Config;

/// Which chart to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Hourly,
    Daily,
    Weekly,
    History,
}

const NO_DATA: &str = "No data available";

/// Builds the requested chart from the whole-log history.
pub fn build_chart(
    report: Report,
    history: &History,
    config: &Config,
    workday: &Workday,
    now: NaiveDateTime,
) -> Result<Chart, ReportError> {
    match report {
        Report::Hourly => hourly_chart(history, workday),
        Report::Daily => daily_chart(history, now, workday),
        Report::Weekly => weekly_chart(history, now, config.weekly_history_days, workday),
        Report::History => recent_history_chart(history, now, config.daily_history_days, workday),
    }
}

/// Renders `report` as text, or the no-data notice.
pub fn render(
    log: &dyn EventLog,
    report: Report,
    config: &Config,
    workday: &Workday,
    now: NaiveDateTime,
) -> Result<String> {
    let events = log.read_all().context("failed to read timesheet")?;

    let history = match History::build(&events, now, workday) {
        Ok(history) => history,
        Err(ReportError::NoData) => return Ok(NO_DATA.to_string()),
        Err(e) => return Err(e.into()),
    };
    let chart = match build_chart(report, &history, config, workday, now) {
        Ok(chart) => chart,
        Err(ReportError::NoData) => return Ok(NO_DATA.to_string()),
        Err(e) => return Err(e.into()),
    };

    let rows = chart
        .render(config.chart_width, config.chart_height)
        .context("failed to render chart")?;
    Ok(rows.join("\n"))
}

pub fn run(
    log: &dyn EventLog,
    report: Report,
    config: &Config,
    workday: &Workday,
    now: NaiveDateTime,
) -> Result<()> {
    println!("{}", render(log, report, config, workday, now)?);
    Ok(())
}

/// Prints the rounded number of hours worked in `year`.
pub fn run_total(
    log: &dyn EventLog,
    year: i32,
    workday: &Workday,
    now: NaiveDateTime,
) -> Result<()> {
    let events = log.read_all().context("failed to read timesheet")?;
    match History::build(&events, now, workday) {
        Ok(history) => println!("{}h", total_hours(&history, year)),
        Err(ReportError::NoData) => println!("{NO_DATA}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
