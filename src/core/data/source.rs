/// One file handed to the pipeline by a release source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the release root, `/`-separated.
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// File name without its extension (`lang/po/zh_CN.po` -> `zh_CN`).
    pub fn stem(&self) -> &str {
        file_stem(&self.path)
    }
}

/// A file read as raw bytes, such as a compiled `.mo` catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFile {
    /// Path relative to the release root, `/`-separated.
    pub path: String,
    pub bytes: Vec<u8>,
}

impl BinaryFile {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }

    /// Locale directory of a compiled catalog.
    ///
    /// `lang/mo/zh_CN/LC_MESSAGES/game.mo` -> `zh_CN`. Outside that layout
    /// the file stem is used.
    pub fn locale(&self) -> &str {
        let mut dirs = self.path.rsplit('/').skip(1);
        match (dirs.next(), dirs.next()) {
            (Some("LC_MESSAGES"), Some(locale)) if !locale.is_empty() => locale,
            _ => file_stem(&self.path),
        }
    }
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
