//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `build`: Build snapshots from extracted release directories
//! - `prune`: Thin out old snapshots and rewrite the snapshot index
//! - `backfill`: Generate missing phonetic indexes for stored snapshots
//! - `init`: Initialize harvest configuration file

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Parse an RFC 3339 timestamp into UTC.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Extracted release directories, one per release
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Build number (defaults to the directory name; single source only)
    #[arg(long)]
    pub build_number: Option<String>,

    /// Mark the release as a prerelease
    #[arg(long)]
    pub prerelease: bool,

    /// Release creation time (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub created_at: Option<DateTime<Utc>>,

    /// JSON file with the release metadata (overrides --prerelease and --created-at)
    #[arg(long, conflicts_with_all = ["prerelease", "created_at"])]
    pub release: Option<PathBuf>,

    /// Snapshot output directory (overrides config file)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Rebuild snapshots that already exist
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct PruneCommand {
    /// Snapshot directory (overrides config file)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Reference time for snapshot ages (defaults to now)
    #[arg(long, value_parser = parse_timestamp)]
    pub now: Option<DateTime<Utc>>,

    /// Only report what would be deleted
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct BackfillCommand {
    /// Snapshot directory (overrides config file)
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build snapshots from extracted release directories
    Build(BuildCommand),
    /// Delete old snapshots under the retention policy and rewrite builds.json
    Prune(PruneCommand),
    /// Generate missing phonetic indexes for stored snapshots
    Backfill(BackfillCommand),
    /// Initialize a new .harvestrc.json configuration file
    Init,
}
