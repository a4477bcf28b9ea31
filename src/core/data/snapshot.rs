use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Release metadata stored in the `release` field of `all.json`.
///
/// Only the fields retention needs are typed; anything else the release
/// feed provides (names, URLs, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReleaseInfo {
    pub fn new(tag_name: impl Into<String>, prerelease: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            tag_name: tag_name.into(),
            prerelease,
            created_at,
            extra: Map::new(),
        }
    }
}

/// One entry of the snapshot index (`builds.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDescriptor {
    /// Snapshot id (the release tag).
    pub build_number: String,
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    /// Locales with a translation document in this snapshot.
    #[serde(default)]
    pub langs: Vec<String>,
}

impl SnapshotDescriptor {
    pub fn new(
        build_number: impl Into<String>,
        prerelease: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            build_number: build_number.into(),
            prerelease,
            created_at,
            langs: Vec::new(),
        }
    }

    pub fn is_stable(&self) -> bool {
        !self.prerelease
    }
}
