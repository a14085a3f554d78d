//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Simple command-line time tracker.
///
/// Records when you clock in and out, then reports how long you worked.
/// Without a subcommand, prints an overview of the current workday.
#[derive(Debug, Parser)]
#[command(name = "punch", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the timesheet (`.db`/`.sqlite` for SQLite, anything else is text).
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new 'in' entry.
    In {
        /// When: `HHhMM`, `HH:MM`, `YYYY/MM/DD HHhMM` or `N minutes|hours ago`.
        /// Defaults to now.
        timestamp: Vec<String>,
    },

    /// Add a new 'out' entry.
    Out {
        /// When: `HHhMM`, `HH:MM`, `YYYY/MM/DD HHhMM` or `N minutes|hours ago`.
        /// Defaults to now.
        timestamp: Vec<String>,
    },

    /// Undo the last entry.
    Undo,

    /// Validate the timesheet.
    Check,

    /// Open the timesheet in a text editor.
    Edit,

    /// Print average time worked per hour of day.
    Hourly,

    /// Print average time worked per weekday.
    Daily,

    /// Print time worked per week.
    Weekly,

    /// Print time worked per day over the recent history.
    History,

    /// Print total hours worked in a year.
    Total {
        /// Calendar year, e.g. 2024.
        year: i32,
    },

    /// Export the timesheet to a JSON file.
    Export {
        /// Destination file; must not exist yet.
        output: PathBuf,
    },

    /// Import entries from a JSON file into an empty timesheet.
    Import {
        /// JSON file written by `punch export`.
        input: PathBuf,
    },
}
