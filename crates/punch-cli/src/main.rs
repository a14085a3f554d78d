use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use punch_core::EventType;
use punch_db::EventLog;
use tracing_subscriber::EnvFilter;

use punch_cli::commands::report::Report;
use punch_cli::commands::{check, edit, entry, export, import, overview, report, undo};
use punch_cli::{Cli, Commands, Config};

/// Resolves the timesheet path: `--file` wins over configuration.
fn timesheet_path(cli_file: Option<&Path>, config: &Config) -> Result<PathBuf> {
    cli_file
        .map(Path::to_path_buf)
        .or_else(|| config.timesheet.clone())
        .context("no timesheet given: pass --file or set PUNCH_TIMESHEET")
}

/// Open the event log, ensuring the parent directory exists.
fn open_log(path: &Path) -> Result<Box<dyn EventLog>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("failed to create timesheet directory")?;
    }
    punch_db::open_log(path).with_context(|| format!("failed to open {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support; stdout is for reports
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let workday = config
        .workday()
        .context("invalid workday_start in configuration")?;

    let path = timesheet_path(cli.file.as_deref(), &config)?;
    let now = chrono::Local::now().naive_local();

    let open = || open_log(&path);
    match &cli.command {
        None => overview::run(open()?.as_ref(), &workday, now)?,
        Some(Commands::In { timestamp }) => {
            entry::run(open()?.as_mut(), EventType::In, timestamp, now)?;
        }
        Some(Commands::Out { timestamp }) => {
            entry::run(open()?.as_mut(), EventType::Out, timestamp, now)?;
        }
        Some(Commands::Undo) => undo::run(open()?.as_mut())?,
        Some(Commands::Check) => check::run(open()?.as_ref())?,
        Some(Commands::Edit) => edit::run(&path)?,
        Some(Commands::Hourly) => {
            report::run(open()?.as_ref(), Report::Hourly, &config, &workday, now)?;
        }
        Some(Commands::Daily) => {
            report::run(open()?.as_ref(), Report::Daily, &config, &workday, now)?;
        }
        Some(Commands::Weekly) => {
            report::run(open()?.as_ref(), Report::Weekly, &config, &workday, now)?;
        }
        Some(Commands::History) => {
            report::run(open()?.as_ref(), Report::History, &config, &workday, now)?;
        }
        Some(Commands::Total { year }) => {
            report::run_total(open()?.as_ref(), *year, &workday, now)?;
        }
        Some(Commands::Export { output }) => export::run(open()?.as_ref(), output)?,
        Some(Commands::Import { input }) => import::run(open()?.as_mut(), input)?,
    }

    Ok(())
}
