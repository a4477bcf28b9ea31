//! Core data types shared by every pipeline stage.
//!
//! ## Module Structure
//!
//! - `object`: Scanned game-data objects and their provenance (`DataObject`, `SourceSpan`)
//! - `snapshot`: Release metadata and snapshot descriptors used by retention
//! - `source`: Raw files handed over by a release source

pub mod object;
pub mod snapshot;
pub mod source;

pub use object::{DataObject, Provenance, SourceSpan};
pub use snapshot::{ReleaseInfo, SnapshotDescriptor};
pub use source::{BinaryFile, SourceFile};
