//! Reading back snapshots that are already on disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::{Config, load_config};
use crate::core::{
    catalog::TranslationTable,
    data::SnapshotDescriptor,
    release::{ALL_FILE, LANG_DIR, PHONETIC_SUFFIX, lang_path},
};

/// Directories in the data root that are copies, not snapshots.
pub const SKIPPED_DIRS: &[&str] = &["latest", "latest.gz"];

/// Load the config for the current working directory.
pub fn current_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(load_config(&cwd)?.config)
}

/// Snapshot directories under `data`, by build number.
///
/// Hidden directories (in-progress builds) and `latest` copies are skipped.
pub fn snapshot_dirs(data: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(data)
        .with_context(|| format!("Failed to read snapshot directory {}", data.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
            continue;
        }
        dirs.push((name, entry.path()));
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

#[derive(Debug, Deserialize)]
struct StoredRelease {
    #[serde(default)]
    prerelease: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ReleaseHeader {
    release: StoredRelease,
}

#[derive(Debug, Deserialize)]
struct StoredBase {
    data: Vec<Map<String, Value>>,
}

/// Index entry of a stored snapshot, from its `all.json` and `lang/` files.
pub fn read_descriptor(build_number: &str, dir: &Path) -> Result<SnapshotDescriptor> {
    let path = dir.join(ALL_FILE);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let header: ReleaseHeader = serde_json::from_str(&text)
        .with_context(|| format!("Missing or invalid release metadata in {}", path.display()))?;

    let mut descriptor = SnapshotDescriptor::new(
        build_number,
        header.release.prerelease,
        header.release.created_at,
    );
    descriptor.langs = stored_langs(dir)?;
    Ok(descriptor)
}

/// Locales with a translation document, excluding phonetic indexes.
pub fn stored_langs(dir: &Path) -> Result<Vec<String>> {
    let lang_dir = dir.join(LANG_DIR);
    if !lang_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut langs = Vec::new();
    for entry in fs::read_dir(&lang_dir)
        .with_context(|| format!("Failed to read {}", lang_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if !stem.ends_with(PHONETIC_SUFFIX) {
            langs.push(stem);
        }
    }
    langs.sort();
    Ok(langs)
}

/// Base entries stored in a snapshot's `all.json`.
pub fn read_base_entries(dir: &Path) -> Result<Vec<Map<String, Value>>> {
    let path = dir.join(ALL_FILE);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let base: StoredBase = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(base.data)
}

/// Compiled translation table of `locale` stored in a snapshot.
pub fn read_translation(dir: &Path, locale: &str) -> Result<TranslationTable> {
    let path = dir.join(lang_path(locale));
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
