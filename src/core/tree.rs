//! Append-only accumulation of the documents that make up one snapshot.
//!
//! The pipeline adds blobs to a `TreeBuilder` as it goes. Nothing touches
//! the filesystem until the builder is finalized and the resulting
//! `SnapshotTree` is written, so a release that fails halfway leaves no
//! files behind.

use std::{
    fs,
    io,
    path::{Component, Path},
};

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("duplicate path in snapshot tree: {0}")]
    DuplicatePath(String),

    #[error("invalid snapshot path: {0}")]
    InvalidPath(String),

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct TreeBuilder {
    blobs: IndexMap<String, Vec<u8>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob at a relative, `/`-separated path.
    pub fn add(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> Result<(), TreeError> {
        let path = path.into();
        validate_path(&path)?;
        if self.blobs.contains_key(&path) {
            return Err(TreeError::DuplicatePath(path));
        }
        self.blobs.insert(path, bytes);
        Ok(())
    }

    /// Add `value` serialized as compact JSON.
    pub fn add_json<T: Serialize + ?Sized>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<(), TreeError> {
        let path = path.into();
        let bytes = serde_json::to_vec(value).map_err(|source| TreeError::Serialize {
            path: path.clone(),
            source,
        })?;
        self.add(path, bytes)
    }

    pub fn finalize(self) -> SnapshotTree {
        SnapshotTree { blobs: self.blobs }
    }
}

/// The finished documents of one snapshot, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotTree {
    blobs: IndexMap<String, Vec<u8>>,
}

impl SnapshotTree {
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.blobs.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    /// Write every blob below `root`, creating directories as needed.
    pub fn write_to(&self, root: &Path) -> io::Result<()> {
        for (path, bytes) in &self.blobs {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, bytes)?;
        }
        Ok(())
    }
}

fn validate_path(path: &str) -> Result<(), TreeError> {
    let relative = Path::new(path);
    let ok = !path.is_empty()
        && !path.contains('\\')
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(TreeError::InvalidPath(path.to_string()))
    }
}
