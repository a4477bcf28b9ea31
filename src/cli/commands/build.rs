use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{error, info, warn};

use super::super::args::BuildCommand;
use super::helper::current_config;
use super::{BuildSummary, BuiltSnapshot, CommandResult, CommandSummary, SkipReason};
use crate::config::Config;
use crate::core::{
    data::ReleaseInfo,
    release::{ALL_FILE, BuildOptions, build_release},
};
use crate::source::DirSource;

/// One release to build.
struct Job {
    source: PathBuf,
    build_number: String,
}

pub fn build(cmd: BuildCommand) -> Result<CommandResult> {
    let config = current_config()?;
    let options = config.build_options()?;
    let out = cmd
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_root));

    let jobs = plan_jobs(&cmd)?;
    let mut summary = BuildSummary {
        built: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
    };

    for job in jobs {
        if let Some(reason) = skip_reason(&config, &job, &out, cmd.force) {
            match reason {
                SkipReason::Forbidden => {
                    warn!("Skipping forbidden tag {}", job.build_number)
                }
                SkipReason::Exists => {
                    info!("Snapshot {} already exists, skipping", job.build_number)
                }
            }
            summary.skipped.push((job.build_number, reason));
            continue;
        }

        info!("Building {} from {}...", job.build_number, job.source.display());
        match build_one(&cmd, &job, &options, &out) {
            Ok(built) => summary.built.push(built),
            Err(err) => {
                error!("Error while processing {}: {:#}", job.build_number, err);
                summary.failed.push((job.build_number, format!("{:#}", err)));
            }
        }
    }

    Ok(CommandResult::new(CommandSummary::Build(summary)))
}

fn plan_jobs(cmd: &BuildCommand) -> Result<Vec<Job>> {
    if cmd.build_number.is_some() && cmd.sources.len() > 1 {
        bail!("--build-number can only be used with a single source directory");
    }

    cmd.sources
        .iter()
        .map(|source| -> Result<Job> {
            let build_number = match &cmd.build_number {
                Some(n) => n.clone(),
                None => default_build_number(source)?,
            };
            Ok(Job {
                source: source.clone(),
                build_number,
            })
        })
        .collect()
}

/// Build number implied by a source directory: its final path component.
fn default_build_number(source: &Path) -> Result<String> {
    let absolute = std::path::absolute(source)
        .with_context(|| format!("Invalid source path {}", source.display()))?;
    absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| {
            format!(
                "Cannot derive a build number from {}, pass --build-number",
                source.display()
            )
        })
}

fn skip_reason(config: &Config, job: &Job, out: &Path, force: bool) -> Option<SkipReason> {
    if config.is_forbidden(&job.build_number) {
        Some(SkipReason::Forbidden)
    } else if !force && out.join(&job.build_number).join(ALL_FILE).exists() {
        Some(SkipReason::Exists)
    } else {
        None
    }
}

fn release_info(cmd: &BuildCommand, build_number: &str) -> Result<ReleaseInfo> {
    match &cmd.release {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read release metadata {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse release metadata {}", path.display()))
        }
        None => Ok(ReleaseInfo::new(
            build_number,
            cmd.prerelease,
            cmd.created_at.unwrap_or_else(Utc::now),
        )),
    }
}

fn build_one(
    cmd: &BuildCommand,
    job: &Job,
    options: &BuildOptions,
    out: &Path,
) -> Result<BuiltSnapshot> {
    if !job.source.is_dir() {
        bail!("Source directory {} does not exist", job.source.display());
    }

    let release = release_info(cmd, &job.build_number)?;
    let built = build_release(
        &DirSource::new(&job.source),
        &job.build_number,
        &release,
        options,
    )?;

    // Stage next to the target, then swap it in.
    let target = out.join(&job.build_number);
    let staging = out.join(format!(".{}.partial", job.build_number));
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to clear {}", staging.display()))?;
    }
    built
        .tree
        .write_to(&staging)
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    if target.exists() {
        fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
    }
    fs::rename(&staging, &target)
        .with_context(|| format!("Failed to move snapshot into {}", target.display()))?;

    info!(
        "Wrote {} ({} objects, {} mods, {} locales)",
        target.display(),
        built.object_count,
        built.mod_count,
        built.descriptor.langs.len()
    );

    Ok(BuiltSnapshot {
        build_number: job.build_number.clone(),
        object_count: built.object_count,
        mod_count: built.mod_count,
        langs: built.descriptor.langs,
    })
}
