//! One release, end to end: source files in, snapshot tree out.

use std::{collections::HashSet, io};

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{
    aggregate::{AggregateError, AggregateOptions, Dataset, aggregate},
    catalog::{TranslationTable, compile_mo, compile_po},
    data::{BinaryFile, DataObject, ReleaseInfo, SnapshotDescriptor, SourceFile},
    parsers::po::CatalogError,
    transliterate::{PhoneticLocales, index},
    tree::{SnapshotTree, TreeBuilder, TreeError},
};

pub const ALL_FILE: &str = "all.json";
pub const ALL_MODS_FILE: &str = "all_mods.json";
pub const LANG_DIR: &str = "lang";
pub const PHONETIC_SUFFIX: &str = "_pinyin";

/// Path of a locale's translation document inside a snapshot.
pub fn lang_path(locale: &str) -> String {
    format!("{LANG_DIR}/{locale}.json")
}

/// Path of a locale's phonetic index inside a snapshot.
pub fn phonetic_path(locale: &str) -> String {
    format!("{LANG_DIR}/{locale}{PHONETIC_SUFFIX}.json")
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid file pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Where the files of one release come from.
///
/// Implementations must return files in a stable order: the order of the
/// generated documents follows it.
pub trait ReleaseSource {
    /// Game-data files whose relative path matches `pattern`.
    fn list_files(&self, pattern: &str) -> Result<Vec<SourceFile>, SourceError>;

    /// Files whose relative path matches `pattern`, as raw bytes.
    fn list_binary(&self, pattern: &str) -> Result<Vec<BinaryFile>, SourceError>;
}

/// The translation catalog of one locale, as shipped in the release.
#[derive(Debug, Clone)]
pub enum Catalog {
    Po(SourceFile),
    Mo(BinaryFile),
}

impl Catalog {
    pub fn path(&self) -> &str {
        match self {
            Catalog::Po(file) => &file.path,
            Catalog::Mo(file) => &file.path,
        }
    }

    pub fn locale(&self) -> &str {
        match self {
            Catalog::Po(file) => file.stem(),
            Catalog::Mo(file) => file.locale(),
        }
    }

    fn compile(&self) -> Result<TranslationTable, CatalogError> {
        match self {
            Catalog::Po(file) => compile_po(&file.text),
            Catalog::Mo(file) => compile_mo(&file.bytes),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("{file}: {source}")]
    Catalog {
        file: String,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// File patterns and per-release processing settings.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub base_pattern: String,
    pub mods_pattern: String,
    pub catalog_pattern: String,
    /// Compiled catalogs, used only when `catalog_pattern` finds nothing.
    pub catalog_fallback_pattern: String,
    pub aggregate: AggregateOptions,
    pub phonetic: PhoneticLocales,
}

/// Contents of `all.json`.
#[derive(Debug, Serialize)]
pub struct BaseDocument<'a> {
    pub build_number: &'a str,
    pub release: &'a ReleaseInfo,
    pub data: &'a [DataObject],
    pub modlist: Vec<&'a str>,
}

/// One compiled locale.
#[derive(Debug, Clone)]
pub struct CompiledLocale {
    pub locale: String,
    pub table: TranslationTable,
    pub phonetic: Option<TranslationTable>,
}

/// The result of building one release.
#[derive(Debug)]
pub struct BuiltRelease {
    pub descriptor: SnapshotDescriptor,
    pub tree: SnapshotTree,
    pub object_count: usize,
    pub mod_count: usize,
}

/// Build the snapshot of one release.
///
/// Nothing is written: the caller decides where the returned tree goes.
/// Any failure aborts the whole release.
pub fn build_release(
    source: &dyn ReleaseSource,
    build_number: &str,
    release: &ReleaseInfo,
    options: &BuildOptions,
) -> Result<BuiltRelease, BuildError> {
    let base_files = source.list_files(&options.base_pattern)?;
    let mod_files = source.list_files(&options.mods_pattern)?;
    debug!(
        base = base_files.len(),
        mods = mod_files.len(),
        "listed game data files"
    );

    let dataset = aggregate(&base_files, &mod_files, &options.aggregate)?;

    let catalogs = list_catalogs(source, options)?;
    info!("Compiling {} catalogs...", catalogs.len());
    let locales = compile_locales(&catalogs, &dataset, &options.phonetic)?;

    let mut builder = TreeBuilder::new();
    builder.add_json(
        ALL_FILE,
        &BaseDocument {
            build_number,
            release,
            data: &dataset.base_entries,
            modlist: dataset.mod_ids(),
        },
    )?;
    builder.add_json(ALL_MODS_FILE, &dataset.mods)?;
    for compiled in &locales {
        builder.add_json(lang_path(&compiled.locale), &compiled.table)?;
        if let Some(phonetic) = &compiled.phonetic {
            builder.add_json(phonetic_path(&compiled.locale), phonetic)?;
        }
    }

    let mut descriptor =
        SnapshotDescriptor::new(build_number, release.prerelease, release.created_at);
    descriptor.langs = locales.iter().map(|c| c.locale.clone()).collect();

    Ok(BuiltRelease {
        descriptor,
        tree: builder.finalize(),
        object_count: dataset.base_entries.len(),
        mod_count: dataset.mods.len(),
    })
}

/// The release's catalogs: `.po` sources, or compiled `.mo` files when the
/// release ships no sources. The first catalog of a locale wins.
fn list_catalogs(
    source: &dyn ReleaseSource,
    options: &BuildOptions,
) -> Result<Vec<Catalog>, SourceError> {
    let mut catalogs: Vec<Catalog> = source
        .list_files(&options.catalog_pattern)?
        .into_iter()
        .map(Catalog::Po)
        .collect();
    if catalogs.is_empty() {
        catalogs = source
            .list_binary(&options.catalog_fallback_pattern)?
            .into_iter()
            .map(Catalog::Mo)
            .collect();
        debug!(count = catalogs.len(), "no source catalogs, using compiled ones");
    }

    let mut seen = HashSet::new();
    catalogs.retain(|catalog| {
        let first = seen.insert(catalog.locale().to_string());
        if !first {
            warn!(
                "Ignoring {}: locale {} already has a catalog",
                catalog.path(),
                catalog.locale()
            );
        }
        first
    });
    Ok(catalogs)
}

/// Compile every catalog, in parallel, keeping the input order.
///
/// Locales matching `phonetic` also get a phonetic index over the base
/// entries of `dataset`.
pub fn compile_locales(
    catalogs: &[Catalog],
    dataset: &Dataset,
    phonetic: &PhoneticLocales,
) -> Result<Vec<CompiledLocale>, BuildError> {
    let base: Vec<&Map<String, Value>> = dataset.base_entries.iter().map(|o| &o.fields).collect();

    catalogs
        .par_iter()
        .map(|catalog| -> Result<CompiledLocale, BuildError> {
            let locale = catalog.locale().to_string();
            let table = catalog.compile().map_err(|source| BuildError::Catalog {
                file: catalog.path().to_string(),
                source,
            })?;
            let phonetic = phonetic
                .matches(&locale)
                .then(|| index(base.iter().copied(), &table));
            Ok(CompiledLocale {
                locale,
                table,
                phonetic,
            })
        })
        .collect()
}
