//! CLI subcommand implementations.

pub mod check;
pub mod edit;
pub mod entry;
pub mod export;
pub mod import;
pub mod overview;
pub mod report;
pub mod undo;
pub mod util;
