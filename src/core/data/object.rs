use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

/// Field carrying `<file>#L<start>-L<end>` in serialized objects.
pub const FILENAME_FIELD: &str = "__filename";

/// Field carrying the mod id in serialized mod objects.
pub const MOD_FIELD: &str = "__mod";

/// Line range of one top-level object in its source file.
///
/// Both ends are 1-indexed and inclusive: an object written on a single
/// line has `start_line == end_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceSpan {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        debug_assert!(start_line >= 1 && start_line <= end_line);
        Self {
            start_line,
            end_line,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}-L{}", self.start_line, self.end_line)
    }
}

/// Where a `DataObject` came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Logical path of the source file, `/`-separated.
    pub file: String,
    pub span: SourceSpan,
    /// Mod id, for objects collected from a mod directory.
    pub mod_id: Option<String>,
}

impl Provenance {
    pub fn new(file: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            file: normalize_path(&file.into()),
            span,
            mod_id: None,
        }
    }

    pub fn with_mod(mut self, mod_id: impl Into<String>) -> Self {
        self.mod_id = Some(mod_id.into());
        self
    }

    /// Serialized form of the file reference, e.g. `data/json/items.json#L3-L9`.
    pub fn filename_tag(&self) -> String {
        format!("{}#{}", self.file, self.span)
    }
}

/// One game-data object plus its provenance.
///
/// Serializes as the original JSON object with `__filename` (and `__mod`
/// for mod objects) appended.
#[derive(Debug, Clone, PartialEq)]
pub struct DataObject {
    pub fields: Map<String, Value>,
    pub origin: Provenance,
}

impl DataObject {
    pub fn new(fields: Map<String, Value>, origin: Provenance) -> Self {
        Self { fields, origin }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `type` discriminator, if present and a string.
    pub fn type_tag(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn mod_id(&self) -> Option<&str> {
        self.origin.mod_id.as_deref()
    }
}

impl Serialize for DataObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let own = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != FILENAME_FIELD && key.as_str() != MOD_FIELD);

        let mut map = serializer.serialize_map(None)?;
        for (key, value) in own {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(FILENAME_FIELD, &self.origin.filename_tag())?;
        if let Some(mod_id) = &self.origin.mod_id {
            map.serialize_entry(MOD_FIELD, mod_id)?;
        }
        map.end()
    }
}

/// Normalize Windows separators so provenance is stable across platforms.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
