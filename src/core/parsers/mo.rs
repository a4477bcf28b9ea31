//! Compiled gettext (`.mo`) catalogs.
//!
//! Layout: a 28-byte header (magic, revision, message count, offset of the
//! source string table, offset of the translation table, hash table size
//! and offset), then two tables of `(length, offset)` pairs pointing at the
//! NUL-terminated strings. The hash table is not needed for a full read.

use super::po::{CONTEXT_SEPARATOR, CatalogError, ParsedCatalog, parse_headers};

const MAGIC: u32 = 0x9504_12de;
const HEADER_LEN: usize = 28;

#[derive(Debug, Clone, Copy)]
enum Endian {
    Little,
    Big,
}

struct Reader<'a> {
    bytes: &'a [u8],
    endian: Endian,
}

impl Reader<'_> {
    fn u32_at(&self, offset: usize) -> Result<u32, CatalogError> {
        let word: [u8; 4] = offset
            .checked_add(4)
            .and_then(|end| self.bytes.get(offset..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| CatalogError::binary(offset, "unexpected end of file"))?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(word),
            Endian::Big => u32::from_be_bytes(word),
        })
    }

    /// The string described by the table slot at `slot`.
    fn string_at(&self, slot: usize) -> Result<&str, CatalogError> {
        let len = self.u32_at(slot)? as usize;
        let start = self.u32_at(slot + 4)? as usize;
        let raw = start
            .checked_add(len)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(|| CatalogError::binary(slot, "string points past the end of file"))?;
        std::str::from_utf8(raw).map_err(|_| CatalogError::binary(start, "string is not UTF-8"))
    }
}

/// Parse the bytes of a `.mo` file into the shape `parse_po` produces.
pub fn parse_mo(bytes: &[u8]) -> Result<ParsedCatalog, CatalogError> {
    if bytes.len() < HEADER_LEN {
        return Err(CatalogError::binary(0, "file is shorter than the header"));
    }
    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let endian = if u32::from_le_bytes(magic) == MAGIC {
        Endian::Little
    } else if u32::from_be_bytes(magic) == MAGIC {
        Endian::Big
    } else {
        return Err(CatalogError::binary(0, "not a compiled gettext catalog"));
    };
    let reader = Reader { bytes, endian };

    let revision = reader.u32_at(4)?;
    if revision >> 16 > 1 {
        return Err(CatalogError::binary(
            4,
            format!("unsupported revision {revision:#x}"),
        ));
    }
    let count = reader.u32_at(8)? as usize;
    let sources = reader.u32_at(12)? as usize;
    let translations = reader.u32_at(16)? as usize;

    let mut catalog = ParsedCatalog::default();
    for i in 0..count {
        let source = reader.string_at(sources + i * 8)?;
        let translation = reader.string_at(translations + i * 8)?;

        if source.is_empty() {
            catalog.headers = Some(parse_headers(translation));
            continue;
        }

        // `id\0plural` for plural entries; forms are NUL-separated too.
        let (id, plural) = match source.split_once('\0') {
            Some((id, plural)) => (id, Some(plural)),
            None => (source, None),
        };
        let msgid = id
            .split_once(CONTEXT_SEPARATOR)
            .map_or(id, |(_, msgid)| msgid);
        let mut slots = Vec::with_capacity(2);
        slots.push(plural.unwrap_or(msgid).to_string());
        slots.extend(translation.split('\0').map(str::to_string));
        catalog.messages.insert(id.to_string(), slots);
    }

    Ok(catalog)
}
