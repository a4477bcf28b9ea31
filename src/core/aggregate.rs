//! Folds scanned files into one release dataset.
//!
//! Base game files become a flat, ordered entry list. Mod files are grouped by
//! the mod directory they live in; each mod's metadata object (`MOD_INFO` by
//! default) is held apart from its entries.
//!
//! Aggregation is all-or-nothing: the first file that fails to scan aborts
//! the whole release and nothing built so far is returned.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{
    data::{DataObject, Provenance, SourceFile, object::normalize_path},
    scanner::{MalformedObjectError, ScannedObject, scan},
};

pub const DEFAULT_MOD_INFO_TYPE: &str = "MOD_INFO";
pub const DEFAULT_MODS_ROOT: &str = "data/mods";

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("{file}: {source}")]
    Scan {
        file: String,
        #[source]
        source: MalformedObjectError,
    },

    #[error("{file}: no mod directory under '{mods_root}'")]
    MissingModSegment { file: String, mods_root: String },
}

/// Knobs for mod collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Directory whose immediate children are mod directories.
    pub mods_root: String,
    /// `type` value that marks a mod's metadata object.
    pub mod_info_type: String,
    /// Drop mods whose metadata has `"obsolete": true`.
    pub skip_obsolete_mods: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            mods_root: DEFAULT_MODS_ROOT.to_string(),
            mod_info_type: DEFAULT_MOD_INFO_TYPE.to_string(),
            skip_obsolete_mods: true,
        }
    }
}

/// Everything collected from one mod directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModBucket {
    pub info: Option<DataObject>,
    #[serde(rename = "data")]
    pub entries: Vec<DataObject>,
}

/// The normalized game data of one release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub base_entries: Vec<DataObject>,
    /// Mods keyed by id, in order of first appearance.
    pub mods: IndexMap<String, ModBucket>,
}

impl Dataset {
    pub fn mod_ids(&self) -> Vec<&str> {
        self.mods.keys().map(String::as_str).collect()
    }

    pub fn mod_entry_count(&self) -> usize {
        self.mods.values().map(|bucket| bucket.entries.len()).sum()
    }
}

/// Build the dataset of one release from its base and mod files.
///
/// Files are processed in the order given; callers must supply a stable
/// order for the output to be reproducible.
pub fn aggregate(
    base_files: &[SourceFile],
    mod_files: &[SourceFile],
    options: &AggregateOptions,
) -> Result<Dataset, AggregateError> {
    let base_entries = collect_base(base_files)?;
    info!("Found {} objects.", base_entries.len());

    let mods = collect_mods(mod_files, options)?;
    let dataset = Dataset { base_entries, mods };
    info!(
        "Found {} objects in {} mods.",
        dataset.mod_entry_count(),
        dataset.mods.len()
    );

    Ok(dataset)
}

fn collect_base(files: &[SourceFile]) -> Result<Vec<DataObject>, AggregateError> {
    let mut entries = Vec::new();
    for file in files {
        for scanned in scan_file(file)? {
            entries.push(DataObject::new(
                scanned.object,
                Provenance::new(&file.path, scanned.span),
            ));
        }
    }
    Ok(entries)
}

fn collect_mods(
    files: &[SourceFile],
    options: &AggregateOptions,
) -> Result<IndexMap<String, ModBucket>, AggregateError> {
    let mut mods: IndexMap<String, ModBucket> = IndexMap::new();
    let mut obsolete: HashSet<String> = HashSet::new();

    for file in files {
        let path = normalize_path(&file.path);
        let mod_id = mod_id_from_path(&path, &options.mods_root).ok_or_else(|| {
            AggregateError::MissingModSegment {
                file: path.clone(),
                mods_root: options.mods_root.clone(),
            }
        })?;

        if obsolete.contains(mod_id) {
            debug!(mod_id, file = %path, "skipping file of obsolete mod");
            continue;
        }

        let scanned = scan_file(file)?;
        let bucket = mods.entry(mod_id.to_string()).or_default();

        for obj in scanned {
            let data = DataObject::new(
                obj.object,
                Provenance::new(&file.path, obj.span).with_mod(mod_id),
            );

            if data.type_tag() == Some(options.mod_info_type.as_str()) {
                if bucket.info.is_some() {
                    warn!(mod_id, file = %path, "duplicate mod metadata, keeping the last one");
                }
                let is_obsolete = data
                    .get("obsolete")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                bucket.info = Some(data);
                if is_obsolete && options.skip_obsolete_mods {
                    obsolete.insert(mod_id.to_string());
                }
            } else {
                if bucket.info.is_none() && bucket.entries.is_empty() {
                    debug!(mod_id, "mod entries seen before its metadata");
                }
                bucket.entries.push(data);
            }
        }
    }

    for mod_id in &obsolete {
        info!(mod_id = %mod_id, "skipping obsolete mod");
        mods.shift_remove(mod_id);
    }

    Ok(mods)
}

fn scan_file(file: &SourceFile) -> Result<Vec<ScannedObject>, AggregateError> {
    scan(&file.text).map_err(|source| AggregateError::Scan {
        file: normalize_path(&file.path),
        source,
    })
}

/// Mod id of a file: the first path segment under `mods_root`.
///
/// `data/mods/aftershock/items/tools.json` -> `aftershock`. Expects a
/// `/`-separated path. Returns `None` when the path is not inside a mod
/// directory.
pub fn mod_id_from_path<'a>(path: &'a str, mods_root: &str) -> Option<&'a str> {
    let root = mods_root.trim_end_matches('/');
    let rest = path.strip_prefix(root)?.strip_prefix('/')?;
    let (mod_id, file) = rest.split_once('/')?;
    if mod_id.is_empty() || file.is_empty() {
        return None;
    }
    Some(mod_id)
}
