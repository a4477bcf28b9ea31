//! Harvest - game data snapshot builder
//!
//! Harvest turns extracted game releases (JSON data files plus gettext
//! catalogs) into normalized per-release snapshots, and prunes old snapshots
//! under an exponential retention policy.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands and summaries)
//! - `config`: Configuration file loading and parsing
//! - `core`: Data pipeline (scanner, aggregator, catalog compiler, retention)
//! - `source`: Release files read from an extracted directory

pub mod cli;
pub mod config;
pub mod core;
pub mod source;
