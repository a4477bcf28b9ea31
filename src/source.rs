//! Release files read from an extracted source directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::core::{
    data::{BinaryFile, SourceFile},
    release::{ReleaseSource, SourceError},
};

/// `*` and `?` never cross a `/`; only `**` spans directories.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A release checked out on disk.
///
/// Paths handed to the pipeline are relative to `root` and `/`-separated,
/// in file-name order at every directory level.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Relative paths of all files under the root matching `pattern`.
    ///
    /// Any directory that cannot be walked fails the listing: a release
    /// with a hole in it must not pass for a complete one.
    pub fn matching_paths(&self, pattern: &str) -> Result<Vec<String>, SourceError> {
        let compiled = Pattern::new(pattern).map_err(|e| SourceError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = relative_path(&self.root, entry.path()) else {
                continue;
            };
            if compiled.matches_with(&relative, MATCH_OPTIONS) {
                paths.push(relative);
            }
        }
        Ok(paths)
    }
}

impl ReleaseSource for DirSource {
    fn list_files(&self, pattern: &str) -> Result<Vec<SourceFile>, SourceError> {
        self.matching_paths(pattern)?
            .into_iter()
            .map(|path| -> Result<SourceFile, SourceError> {
                let text = fs::read_to_string(self.root.join(&path))
                    .map_err(|source| SourceError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Ok(SourceFile::new(path, text))
            })
            .collect()
    }

    fn list_binary(&self, pattern: &str) -> Result<Vec<BinaryFile>, SourceError> {
        self.matching_paths(pattern)?
            .into_iter()
            .map(|path| -> Result<BinaryFile, SourceError> {
                let bytes = fs::read(self.root.join(&path)).map_err(|source| SourceError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(BinaryFile::new(path, bytes))
            })
            .collect()
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> SourceError {
    let path = err
        .path()
        .and_then(|p| relative_path(root, p))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| root.display().to_string());
    SourceError::Read {
        path,
        source: err.into(),
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
