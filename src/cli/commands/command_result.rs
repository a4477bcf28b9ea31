use std::{path::PathBuf, process::ExitCode};

/// How a harvest run ended.
///
/// `Failure` means the command ran to completion but gave up on at least
/// one release, snapshot or index. `Error` means it could not run at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Failure = 1,
    Error = 2,
}

impl ExitStatus {
    fn from_failures(failure_count: usize) -> Self {
        if failure_count == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

#[derive(Debug)]
pub enum CommandSummary {
    Build(BuildSummary),
    Prune(PruneSummary),
    Backfill(BackfillSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct BuiltSnapshot {
    pub build_number: String,
    pub object_count: usize,
    pub mod_count: usize,
    pub langs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Tag is on the forbidden list.
    Forbidden,
    /// Snapshot already exists and `--force` was not given.
    Exists,
}

#[derive(Debug)]
pub struct BuildSummary {
    pub built: Vec<BuiltSnapshot>,
    pub skipped: Vec<(String, SkipReason)>,
    /// Build number and error message of every failed release.
    pub failed: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct PrunedSnapshot {
    pub build_number: String,
    pub age_days: Option<i64>,
}

#[derive(Debug)]
pub struct PruneSummary {
    pub deleted: Vec<PrunedSnapshot>,
    pub kept_count: usize,
    /// Snapshots whose metadata could not be read; left untouched.
    pub unreadable: Vec<(String, String)>,
    /// Condemned snapshots whose directory could not be removed.
    pub failed: Vec<(String, String)>,
    pub index_path: PathBuf,
    pub is_dry_run: bool,
}

#[derive(Debug)]
pub struct BackfillSummary {
    /// `(build_number, locale)` pairs that got a new phonetic index.
    pub written: Vec<(String, String)>,
    /// `(build_number, locale, error)` for every failed index.
    pub failed: Vec<(String, String, String)>,
    /// `(build_number, error)` for snapshots whose locales could not be listed.
    pub unreadable: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running harvest commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Number of releases, snapshots or files the command failed on.
    pub failure_count: usize,
}

impl CommandResult {
    pub fn new(summary: CommandSummary) -> Self {
        let failure_count = match &summary {
            CommandSummary::Build(s) => s.failed.len(),
            CommandSummary::Prune(s) => s.unreadable.len() + s.failed.len(),
            CommandSummary::Backfill(s) => s.failed.len() + s.unreadable.len(),
            CommandSummary::Init(s) => usize::from(!s.created),
        };
        Self {
            summary,
            failure_count,
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::from_failures(self.failure_count)
    }
}
