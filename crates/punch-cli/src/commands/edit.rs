//! The `edit` command: opens a text timesheet in the user's editor.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use punch_db::{EventLog, TextLog, is_sqlite_path};

use super::check;

/// Editor command from `$VISUAL`, then `$EDITOR`, then `vi`.
fn editor_command(visual: Option<String>, editor: Option<String>) -> String {
    [visual, editor]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

pub fn run(path: &Path) -> Result<()> {
    if is_sqlite_path(path) {
        anyhow::bail!(
            "{} is an SQLite timesheet; only text timesheets can be edited",
            path.display()
        );
    }

    let editor = editor_command(std::env::var("VISUAL").ok(), std::env::var("EDITOR").ok());
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or("vi");

    tracing::debug!(%editor, path = %path.display(), "launching editor");
    let status = Command::new(program)
        .args(words)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch editor '{editor}'"))?;
    if !status.success() {
        anyhow::bail!("editor '{editor}' exited with {status}");
    }

    // Hand edits bypass append validation.
    let audit = TextLog::open(path)
        .audit()
        .context("failed to read timesheet")?;
    check::report(&audit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_visual_over_editor() {
        assert_eq!(
            editor_command(Some("code -w".into()), Some("nano".into())),
            "code -w"
        );
    }

    #[test]
    fn falls_back_to_editor_then_vi() {
        assert_eq!(editor_command(None, Some("nano".into())), "nano");
        assert_eq!(editor_command(Some(String::new()), None), "vi");
        assert_eq!(editor_command(None, None), "vi");
    }

    #[test]
    fn refuses_sqlite_timesheet() {
        let err = run(Path::new("/tmp/punch.db")).unwrap_err();
        assert!(err.to_string().contains("only text timesheets"));
    }
}
