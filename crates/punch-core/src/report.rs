//! Report builders: today's overview and the history charts.
//!
//! Every chart runs the same pipeline: events → sessions → hour slices →
//! consolidated hours/days → grouped buckets → [`Chart`].

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::aggregate::{WorkdayProgress, mean, total_duration_in_range, workday_progress};
use crate::bucket::{
    Slice, consolidate_by_day, consolidate_by_hour, group_by_hour_of_day, group_by_week,
    group_by_weekday, slice_sessions_by_hour,
};
use crate::event::Event;
use crate::graph::{ChartError, render_bargraph};
use crate::session::{MismatchedEntry, Policy, Session, reconstruct, sessions_in_range};
use crate::workday::Workday;

/// Short weekday names, Monday first.
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const HOUR_SECONDS: f64 = 3600.0;

/// Report failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// There is nothing to report on.
    #[error("no data available")]
    NoData,
    #[error(transparent)]
    Mismatch(#[from] MismatchedEntry),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Values and labels ready for [`render_bargraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub bounds: (f64, f64),
}

impl Chart {
    pub fn render(&self, width: usize, height: usize) -> Result<Vec<String>, ChartError> {
        render_bargraph(&self.values, &self.labels, self.bounds, width, height)
    }
}

/// The current workday: its sessions and the progress towards the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub sessions: Vec<Session>,
    pub worked_seconds: i64,
    pub progress: WorkdayProgress,
}

/// Summarizes the workday containing `now`.
///
/// Uses strict alternation: today's log must be well formed.
pub fn overview(
    events: &[Event],
    now: NaiveDateTime,
    workday: &Workday,
) -> Result<Overview, MismatchedEntry> {
    let from = workday.start_for(now);
    let sessions = sessions_in_range(events, from, Duration::days(1), workday, Policy::Strict)?;
    let worked_seconds = sessions
        .iter()
        .map(|s| s.duration(now).num_seconds())
        .sum();
    let progress = workday_progress(worked_seconds, workday.target_seconds, now);

    Ok(Overview {
        sessions,
        worked_seconds,
        progress,
    })
}

/// Whole-log history, sliced by hour and consolidated by hour and workday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    pub hourly: Vec<Slice>,
    pub daily: Vec<Slice>,
}

impl History {
    /// Builds history from every event, skipping alternation errors.
    pub fn build(
        events: &[Event],
        now: NaiveDateTime,
        workday: &Workday,
    ) -> Result<Self, ReportError> {
        if events.is_empty() {
            return Err(ReportError::NoData);
        }
        let sessions = reconstruct(events, workday, Policy::Lenient)?;
        let slices = slice_sessions_by_hour(&sessions, now);
        let hourly = consolidate_by_hour(&slices);
        let daily = consolidate_by_day(&hourly, workday);
        Ok(Self { hourly, daily })
    }

    /// Workdays whose reference is at or after `since`.
    fn daily_since(&self, since: NaiveDateTime) -> Vec<Slice> {
        self.daily
            .iter()
            .filter(|s| s.reference >= since)
            .copied()
            .collect()
    }
}

/// Average worked time per hour of day across all active workdays.
///
/// Hours are rotated so the chart starts at the workday-start hour.
#[allow(clippy::cast_precision_loss)]
pub fn hourly_chart(history: &History, workday: &Workday) -> Result<Chart, ReportError> {
    let days = history.daily.iter().filter(|s| s.seconds > 0).count();
    if days == 0 {
        return Err(ReportError::NoData);
    }

    let hours = group_by_hour_of_day(&history.hourly);
    let first = workday.start.hour() as usize;
    let (values, labels) = (0..24)
        .map(|offset| (first + offset) % 24)
        .map(|hour| {
            let total: i64 = hours[hour].iter().sum();
            (total as f64 / days as f64, format!("{hour:02}"))
        })
        .unzip();

    Ok(Chart {
        values,
        labels,
        bounds: (0.0, HOUR_SECONDS),
    })
}

/// Average worked time per weekday over completed workdays.
///
/// The workday containing `now` is still in progress and left out.
#[allow(clippy::cast_precision_loss)]
pub fn daily_chart(
    history: &History,
    now: NaiveDateTime,
    workday: &Workday,
) -> Result<Chart, ReportError> {
    let current = workday.start_for(now);
    let completed: Vec<Slice> = history
        .daily
        .iter()
        .filter(|s| s.reference != current)
        .copied()
        .collect();
    if completed.is_empty() {
        return Err(ReportError::NoData);
    }

    let weekdays = group_by_weekday(&completed, workday);
    let values = weekdays.iter().map(|d| mean(d)).collect();
    let labels = weekdays
        .iter()
        .zip(WEEKDAYS)
        .map(|(d, name)| format!("{name} ({})", d.len()))
        .collect();

    Ok(Chart {
        values,
        labels,
        bounds: (0.0, workday.target_seconds as f64),
    })
}

/// Worked time per workday over the last `days` days.
#[allow(clippy::cast_precision_loss)]
pub fn recent_history_chart(
    history: &History,
    now: NaiveDateTime,
    days: i64,
    workday: &Workday,
) -> Result<Chart, ReportError> {
    let recent = history.daily_since(now - Duration::days(days));
    if recent.is_empty() {
        return Err(ReportError::NoData);
    }

    let values = recent.iter().map(|s| s.seconds as f64).collect();
    let labels = recent
        .iter()
        .map(|s| {
            let weekday = WEEKDAYS[s.reference.weekday().num_days_from_monday() as usize];
            format!("{} {:02}", &weekday[..2], s.reference.day())
        })
        .collect();

    Ok(Chart {
        values,
        labels,
        bounds: (0.0, workday.target_seconds as f64),
    })
}

/// Worked time per ISO week over the last `days` days, labelled with the
/// number of active days in each week.
#[allow(clippy::cast_precision_loss)]
pub fn weekly_chart(
    history: &History,
    now: NaiveDateTime,
    days: i64,
    workday: &Workday,
) -> Result<Chart, ReportError> {
    let recent = history.daily_since(now - Duration::days(days));
    let weeks = group_by_week(&recent, workday);
    if weeks.is_empty() {
        return Err(ReportError::NoData);
    }

    let values = weeks.values().map(|w| w.seconds as f64).collect();
    let labels = weeks
        .iter()
        .map(|(week, bucket)| format!("W{:02} ({})", week.week(), bucket.active_days()))
        .collect();

    Ok(Chart {
        values,
        labels,
        bounds: (0.0, 5.0 * workday.target_seconds as f64),
    })
}

/// Hours worked in workdays starting during calendar `year`, rounded.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn total_hours(history: &History, year: i32) -> i64 {
    let (Some(from), Some(to)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year + 1, 1, 1),
    ) else {
        return 0;
    };
    let seconds = total_duration_in_range(
        &history.daily,
        from.and_time(chrono::NaiveTime::default()),
        to.and_time(chrono::NaiveTime::default()),
    );
    (seconds as f64 / HOUR_SECONDS).round() as i64
}
