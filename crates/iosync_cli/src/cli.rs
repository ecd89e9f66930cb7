//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Export the Instruments table to a workbook and re-import edits.
#[derive(Parser, Debug)]
#[command(name = "iosync", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML file with `[sync]` and `[logging]` tables
    #[arg(long, global = true, env = "IOSYNC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "IOSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "IOSYNC_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write eligible instruments to a four-sheet workbook
    Export(ExportArgs),

    /// Apply an edited workbook to the store in one transaction
    Import(ImportArgs),

    /// List store tables and preview one of them
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// SQLite store holding the Instruments table
    pub store: PathBuf,

    /// Destination workbook
    pub snapshot: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// SQLite store holding the Instruments table
    pub store: PathBuf,

    /// Edited workbook
    pub snapshot: PathBuf,

    /// Report planned changes without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// SQLite store to inspect
    pub store: PathBuf,

    /// Table to preview (defaults to the first table)
    #[arg(long, short = 't')]
    pub table: Option<String>,

    /// Maximum preview rows
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,
}
