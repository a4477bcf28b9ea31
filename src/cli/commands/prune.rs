use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use super::super::args::PruneCommand;
use super::helper::{current_config, read_descriptor, snapshot_dirs};
use super::{CommandResult, CommandSummary, PruneSummary, PrunedSnapshot};
use crate::core::retention::{Verdict, plan};

pub const INDEX_FILE: &str = "builds.json";

pub fn prune(cmd: PruneCommand) -> Result<CommandResult> {
    let config = current_config()?;
    let policy = config.retention_policy()?;
    let data = cmd
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_root));
    let now = cmd.now.unwrap_or_else(Utc::now);

    info!("Collecting info from all builds...");
    let mut snapshots = Vec::new();
    let mut unreadable = Vec::new();
    for (build_number, dir) in snapshot_dirs(&data)? {
        match read_descriptor(&build_number, &dir) {
            Ok(descriptor) => snapshots.push(descriptor),
            Err(err) => {
                warn!("Leaving {} untouched: {:#}", build_number, err);
                unreadable.push((build_number, format!("{:#}", err)));
            }
        }
    }

    let retention = plan(&snapshots, now, &policy);
    let (deleted, failed) = if cmd.dry_run {
        for verdict in retention.deleted() {
            info!("Would delete {} ({} days old)", verdict.build_number, age(verdict));
        }
        (retention.deleted().map(pruned).collect(), Vec::new())
    } else {
        delete_snapshots(&data, retention.deleted(), |dir| fs::remove_dir_all(dir))
    };

    let survivors = retention.survivors(&snapshots);
    let index_path = data.join(INDEX_FILE);
    if !cmd.dry_run {
        let json = serde_json::to_string(&survivors).context("Failed to serialize build index")?;
        fs::write(&index_path, json)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;
        info!(
            "Wrote info about {} builds to {}.",
            survivors.len(),
            index_path.display()
        );
    }

    Ok(CommandResult::new(CommandSummary::Prune(PruneSummary {
        deleted,
        kept_count: survivors.len(),
        unreadable,
        failed,
        index_path,
        is_dry_run: cmd.dry_run,
    })))
}

fn age(verdict: &Verdict) -> String {
    verdict
        .age_days
        .map_or_else(|| "?".to_string(), |d| d.to_string())
}

fn pruned(verdict: &Verdict) -> PrunedSnapshot {
    PrunedSnapshot {
        build_number: verdict.build_number.clone(),
        age_days: verdict.age_days,
    }
}

/// Remove every condemned snapshot directory with `remove`.
///
/// A failed removal is recorded and the rest still go; the snapshot stays
/// out of the index either way.
fn delete_snapshots<'a, F>(
    data: &Path,
    verdicts: impl Iterator<Item = &'a Verdict>,
    mut remove: F,
) -> (Vec<PrunedSnapshot>, Vec<(String, String)>)
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for verdict in verdicts {
        info!("Deleting {} ({} days old)", verdict.build_number, age(verdict));
        let dir = data.join(&verdict.build_number);
        match remove(&dir).with_context(|| format!("Failed to delete {}", dir.display())) {
            Ok(()) => deleted.push(pruned(verdict)),
            Err(err) => {
                error!("{:#}", err);
                failed.push((verdict.build_number.clone(), format!("{:#}", err)));
            }
        }
    }
    (deleted, failed)
}
