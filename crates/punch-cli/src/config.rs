//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use punch_core::Workday;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the timesheet. Overridden by `--file`.
    pub timesheet: Option<PathBuf>,
    /// Time of day (`HH:MM`) at which a new workday begins.
    pub workday_start: String,
    /// Target length of a workday.
    pub workday_hours: f64,
    /// Days covered by the `history` report.
    pub daily_history_days: i64,
    /// Days covered by the `weekly` report.
    pub weekly_history_days: i64,
    /// Inner width of rendered charts.
    pub chart_width: usize,
    /// Inner height of rendered charts.
    pub chart_height: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("timesheet", &self.timesheet)
            .field("workday_start", &self.workday_start)
            .field("workday_hours", &self.workday_hours)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timesheet: None,
            workday_start: "06:00".to_string(),
            workday_hours: 8.0,
            daily_history_days: 18,
            weekly_history_days: 70,
            chart_width: 96,
            chart_height: 12,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PUNCH_*)
        figment = figment.merge(Env::prefixed("PUNCH_"));

        figment.extract()
    }

    /// Workday settings for bucketing and reports.
    #[allow(clippy::cast_possible_truncation)]
    pub fn workday(&self) -> Result<Workday, chrono::ParseError> {
        let start = NaiveTime::parse_from_str(&self.workday_start, "%H:%M")?;
        let target_seconds = (self.workday_hours * 3600.0).round() as i64;
        Ok(Workday::new(start, target_seconds))
    }
}

/// Returns the platform-specific config directory for punch.
///
/// On Linux: `~/.config/punch`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("punch"))
}
