//! Flattens parsed gettext catalogs into direct lookup tables.
//!
//! The compiled table is what the front end loads per locale: a JSON object
//! keyed by source string, with the catalog header under the empty key.
//! Untranslated messages are left out entirely, so a missing key and an
//! untranslated one look the same to consumers.

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::Error as _,
    ser::SerializeMap,
};
use serde_json::Value;
use tracing::warn;

use crate::core::parsers::{
    mo::parse_mo,
    po::{CatalogError, ParsedCatalog, parse_po},
};

/// Header fields kept from the catalog header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(
        rename = "plural-forms",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub plural_forms: Option<String>,
}

/// A translated value: one string, or one string per plural form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation {
    Single(String),
    Plural(Vec<String>),
}

impl Translation {
    /// Apply `f` to every string, keeping the single/plural shape.
    pub fn map(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            Translation::Single(s) => Translation::Single(f(s)),
            Translation::Plural(forms) => {
                Translation::Plural(forms.iter().map(|s| f(s)).collect())
            }
        }
    }
}

/// Compiled translations of one locale.
///
/// Serializes as a single JSON object: the header under `""`, followed by
/// the entries in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    pub header: CatalogHeader,
    pub entries: IndexMap<String, Translation>,
}

/// Phonetic renderings of translated names, keyed like a `TranslationTable`.
pub type TransliterationTable = TranslationTable;

impl TranslationTable {
    pub fn new(header: CatalogHeader) -> Self {
        Self {
            header,
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Translation> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TranslationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry("", &self.header)?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TranslationTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut table = TranslationTable::default();
        for (key, value) in raw {
            if key.is_empty() {
                table.header = serde_json::from_value(value).map_err(D::Error::custom)?;
            } else {
                let translation = serde_json::from_value(value).map_err(D::Error::custom)?;
                table.entries.insert(key, translation);
            }
        }
        Ok(table)
    }
}

/// Compile a parsed catalog into a lookup table.
///
/// - The header keeps only `language` and `plural-forms`; a catalog without
///   a header gets an empty one.
/// - Messages whose first translation is empty are dropped.
/// - A message with exactly one translation maps to that string; one with
///   plural forms maps to all of them, in order.
pub fn compile(catalog: &ParsedCatalog) -> TranslationTable {
    let header = match &catalog.headers {
        Some(headers) => CatalogHeader {
            language: headers.get("language").cloned(),
            plural_forms: headers.get("plural-forms").cloned(),
        },
        None => {
            warn!("catalog has no header entry, using an empty header");
            CatalogHeader::default()
        }
    };

    let mut table = TranslationTable::new(header);
    for (key, slots) in &catalog.messages {
        let Some(first) = slots.get(1) else {
            continue;
        };
        if first.is_empty() {
            continue;
        }
        let translation = if slots.len() == 2 {
            Translation::Single(first.clone())
        } else {
            Translation::Plural(slots[1..].to_vec())
        };
        table.entries.insert(key.clone(), translation);
    }
    table
}

/// Parse and compile the text of a `.po` file.
pub fn compile_po(text: &str) -> Result<TranslationTable, CatalogError> {
    parse_po(text).map(|catalog| compile(&catalog))
}

/// Parse and compile the bytes of a `.mo` file.
pub fn compile_mo(bytes: &[u8]) -> Result<TranslationTable, CatalogError> {
    parse_mo(bytes).map(|catalog| compile(&catalog))
}
