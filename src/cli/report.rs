//! Summary printing for CLI commands.
//!
//! Diagnostics go through `tracing` on stderr; the final per-command summary
//! is printed here, to stdout.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{
    BackfillSummary, BuildSummary, CommandResult, CommandSummary, InitSummary, PruneSummary,
    SkipReason,
};
use crate::config::CONFIG_FILE_NAME;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

pub fn print(result: &CommandResult) {
    print_to(result, &mut io::stdout().lock());
}

pub fn print_to<W: Write>(result: &CommandResult, writer: &mut W) {
    match &result.summary {
        CommandSummary::Build(summary) => print_build(summary, writer),
        CommandSummary::Prune(summary) => print_prune(summary, writer),
        CommandSummary::Backfill(summary) => print_backfill(summary, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

fn print_build<W: Write>(summary: &BuildSummary, writer: &mut W) {
    for built in &summary.built {
        let _ = writeln!(
            writer,
            "{:>9} {} ({} objects, {}, {})",
            "Built".green().bold(),
            built.build_number,
            built.object_count,
            plural(built.mod_count, "mod"),
            plural(built.langs.len(), "locale")
        );
    }
    for (build_number, reason) in &summary.skipped {
        let why = match reason {
            SkipReason::Forbidden => "forbidden tag",
            SkipReason::Exists => "already built",
        };
        let _ = writeln!(writer, "{:>9} {} ({})", "Skipped".yellow().bold(), build_number, why);
    }
    for (build_number, error) in &summary.failed {
        let _ = writeln!(writer, "{:>9} {}: {}", "Failed".red().bold(), build_number, error);
    }

    let totals = format!(
        "{} built, {} skipped, {} failed",
        summary.built.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    if summary.failed.is_empty() {
        let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), totals.green());
    } else {
        let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), totals.red());
    }
}

fn print_prune<W: Write>(summary: &PruneSummary, writer: &mut W) {
    let verb = if summary.is_dry_run {
        "Would delete"
    } else {
        "Deleted"
    };
    for snapshot in &summary.deleted {
        let age = snapshot
            .age_days
            .map_or_else(String::new, |d| format!(" ({} days old)", d));
        let _ = writeln!(
            writer,
            "{:>12} {}{}",
            verb.yellow().bold(),
            snapshot.build_number,
            age
        );
    }
    for (build_number, error) in &summary.unreadable {
        let _ = writeln!(
            writer,
            "{:>12} {}: {}",
            "Unreadable".red().bold(),
            build_number,
            error
        );
    }
    for (build_number, error) in &summary.failed {
        let _ = writeln!(
            writer,
            "{:>12} {}: {}",
            "Failed".red().bold(),
            build_number,
            error
        );
    }

    let totals = format!(
        "{} {}, {} kept",
        verb.to_lowercase(),
        plural(summary.deleted.len(), "snapshot"),
        summary.kept_count
    );
    if summary.unreadable.is_empty() && summary.failed.is_empty() {
        let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), totals.green());
    } else {
        let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), totals.red());
    }
    if !summary.is_dry_run {
        let _ = writeln!(writer, "Index written to {}", summary.index_path.display());
    }
}

fn print_backfill<W: Write>(summary: &BackfillSummary, writer: &mut W) {
    for (build_number, locale) in &summary.written {
        let _ = writeln!(writer, "{:>9} {} {}", "Indexed".green().bold(), build_number, locale);
    }
    for (build_number, locale, error) in &summary.failed {
        let _ = writeln!(
            writer,
            "{:>9} {} {}: {}",
            "Failed".red().bold(),
            build_number,
            locale,
            error
        );
    }
    for (build_number, error) in &summary.unreadable {
        let _ = writeln!(
            writer,
            "{:>9} {}: {}",
            "Unreadable".red().bold(),
            build_number,
            error
        );
    }

    let written = summary.written.len();
    let failed = summary.failed.len() + summary.unreadable.len();
    let totals = format!(
        "Backfilled {} phonetic {}, {} failed",
        written,
        if written == 1 { "index" } else { "indexes" },
        failed
    );
    if failed == 0 {
        let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), totals.green());
    } else {
        let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), totals.red());
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} already exists", CONFIG_FILE_NAME).red()
        );
    }
}
