//! Core data pipeline.
//!
//! Leaf-first:
//!
//! - `scanner`: splits raw text into top-level JSON objects with line spans
//! - `aggregate`: folds scanned files into a base dataset and per-mod buckets
//! - `parsers`: gettext `.po` reader
//! - `catalog`: flattens a parsed catalog into a translation table
//! - `transliterate`: phonetic index of translated names
//! - `retention`: decides which historical snapshots survive
//! - `tree`: append-only builder for the documents of one snapshot
//! - `release`: runs one release through all of the above

pub mod aggregate;
pub mod catalog;
pub mod data;
pub mod parsers;
pub mod release;
pub mod retention;
pub mod scanner;
pub mod transliterate;
pub mod tree;

pub use aggregate::{AggregateError, AggregateOptions, Dataset, ModBucket, aggregate};
pub use catalog::{Translation, TranslationTable, TransliterationTable, compile, compile_po};
pub use release::{BuildError, BuildOptions, BuiltRelease, ReleaseSource, SourceError, build_release};
pub use retention::{Decision, RetentionPlan, RetentionPolicy, plan};
pub use scanner::{MalformedObjectError, ScannedObject, scan};
pub use tree::{SnapshotTree, TreeBuilder};
