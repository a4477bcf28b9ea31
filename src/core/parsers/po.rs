use std::collections::BTreeMap;

use indexmap::IndexMap;
use thiserror::Error;

/// Separator between `msgctxt` and `msgid` in catalog keys.
pub const CONTEXT_SEPARATOR: char = '\u{4}';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("byte {offset}: {message}")]
    Binary { offset: usize, message: String },
}

impl CatalogError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(super) fn binary(offset: usize, message: impl Into<String>) -> Self {
        Self::Binary {
            offset,
            message: message.into(),
        }
    }
}

/// A gettext catalog in the raw shape the compiler consumes.
///
/// Every message maps to its slots: slot 0 is the source text (the plural
/// source when the entry has one), slots 1.. are the translations in
/// `msgstr[n]` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    /// Header fields with lowercased names; `None` when the catalog has no
    /// header entry.
    pub headers: Option<IndexMap<String, String>>,
    pub messages: IndexMap<String, Vec<String>>,
}

/// Which string a continuation line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    Plural,
    Str(usize),
}

#[derive(Debug, Default)]
struct PendingEntry {
    context: Option<String>,
    id: Option<String>,
    plural: Option<String>,
    strs: BTreeMap<usize, String>,
    fuzzy: bool,
    last: Option<Field>,
}

impl PendingEntry {
    fn is_empty(&self) -> bool {
        self.context.is_none() && self.id.is_none() && !self.fuzzy
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Context => self.context.get_or_insert_with(String::new),
            Field::Id => self.id.get_or_insert_with(String::new),
            Field::Plural => self.plural.get_or_insert_with(String::new),
            Field::Str(index) => self.strs.entry(index).or_default(),
        }
    }
}

/// Parse the text of a `.po` file.
///
/// Comments and obsolete (`#~`) entries are ignored. Entries flagged
/// `fuzzy` are dropped, except the header.
pub fn parse_po(text: &str) -> Result<ParsedCatalog, CatalogError> {
    let mut catalog = ParsedCatalog::default();
    let mut entry = PendingEntry::default();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if !entry.strs.is_empty() {
                finish_entry(std::mem::take(&mut entry), &mut catalog);
            }
            if let Some(flags) = comment.strip_prefix(',') {
                entry.fuzzy |= flags.split(',').any(|flag| flag.trim() == "fuzzy");
            }
            continue;
        }

        if line.starts_with('"') {
            let Some(field) = entry.last else {
                return Err(CatalogError::parse(
                    line_no,
                    "string continuation without a keyword",
                ));
            };
            let value = parse_po_string(line).map_err(|m| CatalogError::parse(line_no, m))?;
            entry.field_mut(field).push_str(&value);
            continue;
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| CatalogError::parse(line_no, format!("unexpected line: {line}")))?;
        let field = parse_keyword(keyword)
            .ok_or_else(|| CatalogError::parse(line_no, format!("unknown keyword: {keyword}")))?;
        let value = parse_po_string(rest).map_err(|m| CatalogError::parse(line_no, m))?;

        // A context or msgid after a complete entry starts the next one.
        let starts_new = matches!(field, Field::Context)
            || (matches!(field, Field::Id) && entry.id.is_some());
        if starts_new && (entry.id.is_some() || !entry.strs.is_empty()) {
            let fuzzy = entry.fuzzy && entry.id.is_none();
            finish_entry(std::mem::take(&mut entry), &mut catalog);
            entry.fuzzy = fuzzy;
        }

        *entry.field_mut(field) = value;
        entry.last = Some(field);
    }

    if !entry.is_empty() {
        finish_entry(entry, &mut catalog);
    }

    Ok(catalog)
}

fn parse_keyword(keyword: &str) -> Option<Field> {
    match keyword {
        "msgctxt" => Some(Field::Context),
        "msgid" => Some(Field::Id),
        "msgid_plural" => Some(Field::Plural),
        "msgstr" => Some(Field::Str(0)),
        _ => {
            let index = keyword.strip_prefix("msgstr[")?.strip_suffix(']')?;
            index.parse().ok().map(Field::Str)
        }
    }
}

fn finish_entry(entry: PendingEntry, catalog: &mut ParsedCatalog) {
    let Some(id) = entry.id else {
        return;
    };

    if id.is_empty() && entry.context.is_none() {
        let header = entry.strs.get(&0).map(String::as_str).unwrap_or_default();
        catalog.headers = Some(parse_headers(header));
        return;
    }

    if entry.fuzzy {
        return;
    }

    let key = match entry.context {
        Some(context) => format!("{context}{CONTEXT_SEPARATOR}{id}"),
        None => id.clone(),
    };

    let slot_count = entry.strs.keys().next_back().map_or(0, |last| last + 1);
    let mut slots = Vec::with_capacity(slot_count + 1);
    slots.push(entry.plural.unwrap_or(id));
    slots.extend((0..slot_count).map(|i| entry.strs.get(&i).cloned().unwrap_or_default()));

    catalog.messages.insert(key, slots);
}

/// Split the header msgstr into `name: value` fields, names lowercased.
pub(super) fn parse_headers(header: &str) -> IndexMap<String, String> {
    header
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Decode one quoted PO string, including its C-style escapes.
fn parse_po_string(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return Err(format!("invalid po string: {s}"));
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => return Err(format!("dangling escape in po string: {s}")),
        }
    }
    Ok(out)
}
