use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use super::super::args::BackfillCommand;
use super::helper::{
    current_config, read_base_entries, read_translation, snapshot_dirs, stored_langs,
};
use super::{BackfillSummary, CommandResult, CommandSummary};
use crate::core::{
    release::phonetic_path,
    transliterate::{PhoneticLocales, index},
};

pub fn backfill(cmd: BackfillCommand) -> Result<CommandResult> {
    let config = current_config()?;
    let phonetic = config.phonetic_locales()?;
    let data = cmd
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_root));

    info!("Backfilling phonetic indexes...");
    let mut summary = BackfillSummary {
        written: Vec::new(),
        failed: Vec::new(),
        unreadable: Vec::new(),
    };

    for (build_number, dir) in snapshot_dirs(&data)? {
        let missing = match missing_locales(&dir, &phonetic) {
            Ok(missing) => missing,
            Err(err) => {
                error!("Error while reading {}: {:#}", build_number, err);
                summary.unreadable.push((build_number, format!("{:#}", err)));
                continue;
            }
        };
        if missing.is_empty() {
            continue;
        }

        // all.json is large; read it once per snapshot.
        let entries = match read_base_entries(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                error!("Error while reading {}: {:#}", build_number, err);
                for locale in missing {
                    summary
                        .failed
                        .push((build_number.clone(), locale, format!("{:#}", err)));
                }
                continue;
            }
        };

        for locale in missing {
            info!("Backfilling {} {}...", build_number, locale);
            let result = read_translation(&dir, &locale).and_then(|table| {
                write_index(&dir, &locale, &serde_json::to_vec(&index(&entries, &table))?)
            });
            match result {
                Ok(()) => summary.written.push((build_number.clone(), locale)),
                Err(err) => {
                    error!("Error while backfilling {} {}: {:#}", build_number, locale, err);
                    summary
                        .failed
                        .push((build_number.clone(), locale, format!("{:#}", err)));
                }
            }
        }
    }

    Ok(CommandResult::new(CommandSummary::Backfill(summary)))
}

/// Phonetic locales of a snapshot that have no index yet.
fn missing_locales(dir: &Path, phonetic: &PhoneticLocales) -> Result<Vec<String>> {
    Ok(stored_langs(dir)?
        .into_iter()
        .filter(|locale| phonetic.matches(locale))
        .filter(|locale| !dir.join(phonetic_path(locale)).exists())
        .collect())
}

fn write_index(dir: &Path, locale: &str, bytes: &[u8]) -> Result<()> {
    let path = dir.join(phonetic_path(locale));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
