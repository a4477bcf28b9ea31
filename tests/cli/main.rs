use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use serde_json::Value;
use tempfile::TempDir;

mod backfill;
mod build;
mod init;
mod prune;

const BIN_NAME: &str = "harvest";

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        // Keep config discovery inside the temp project.
        fs::create_dir(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn write_bytes(&self, path: &str, content: &[u8]) -> Result<()> {
        let file_path = self.project_dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd.env("RUST_LOG", "off"); // Keep log lines out of snapshots
        cmd
    }

    pub fn build_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("build");
        cmd
    }

    pub fn prune_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("prune");
        cmd
    }

    pub fn backfill_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("backfill");
        cmd
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn read_json(&self, path: &str) -> Result<Value> {
        let content = self.read_file(path)?;
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.project_dir.join(path).exists()
    }

    /// Write a minimal extracted release under `releases/<tag>`.
    pub fn write_release(&self, tag: &str) -> Result<()> {
        let root = format!("releases/{tag}");
        self.write_file(
            &format!("{root}/data/json/items/tools.json"),
            r#"[
  {
    "type": "GENERIC",
    "id": "rock",
    "name": "rock"
  },
  {
    "type": "GENERIC",
    "id": "stick",
    "name": { "str": "stick", "str_pl": "sticks" }
  }
]
"#,
        )?;
        self.write_file(
            &format!("{root}/data/mods/magiclysm/modinfo.json"),
            r#"[{ "type": "MOD_INFO", "id": "magiclysm", "name": "Magiclysm" }]"#,
        )?;
        self.write_file(
            &format!("{root}/data/mods/magiclysm/items.json"),
            r#"[{ "type": "GENERIC", "id": "wand" }]"#,
        )?;
        self.write_file(
            &format!("{root}/data/mods/old/modinfo.json"),
            r#"[{ "type": "MOD_INFO", "id": "old", "obsolete": true }]"#,
        )?;
        self.write_file(
            &format!("{root}/data/mods/old/items.json"),
            r#"[{ "type": "GENERIC", "id": "relic" }]"#,
        )?;
        self.write_file(
            &format!("{root}/lang/po/zh_CN.po"),
            r#"msgid ""
msgstr ""
"Language: zh_CN\n"
"Plural-Forms: nplurals=1; plural=0;\n"

msgid "rock"
msgstr "石头"

msgid "stick"
msgid_plural "sticks"
msgstr[0] "木棍"

msgid "untranslated"
msgstr ""
"#,
        )?;
        self.write_file(
            &format!("{root}/lang/po/de.po"),
            r#"msgid ""
msgstr ""
"Language: de\n"

msgid "rock"
msgstr "Stein"
"#,
        )?;
        Ok(())
    }

    /// Write a stored snapshot with just the metadata pruning reads.
    pub fn write_snapshot(&self, tag: &str, prerelease: bool, created_at: &str) -> Result<()> {
        self.write_file(
            &format!("data/{tag}/all.json"),
            &format!(
                r#"{{"build_number":"{tag}","release":{{"tag_name":"{tag}","prerelease":{prerelease},"created_at":"{created_at}"}},"data":[]}}"#
            ),
        )?;
        self.write_file(&format!("data/{tag}/lang/de.json"), r#"{"":{}}"#)
    }
}

/// Encode `(source, translation)` pairs as a little-endian `.mo` catalog.
pub fn mo_bytes(messages: &[(&str, &str)]) -> Vec<u8> {
    const HEADER_LEN: usize = 28;
    let count = messages.len();
    let sources = HEADER_LEN;
    let translations = sources + count * 8;
    let mut strings_at = translations + count * 8;

    let mut tables = Vec::new();
    let mut strings = Vec::new();
    let columns = [
        messages.iter().map(|m| m.0).collect::<Vec<_>>(),
        messages.iter().map(|m| m.1).collect::<Vec<_>>(),
    ];
    for column in columns {
        for s in column {
            tables.extend((s.len() as u32).to_le_bytes());
            tables.extend((strings_at as u32).to_le_bytes());
            strings.extend(s.as_bytes());
            strings.push(0);
            strings_at += s.len() + 1;
        }
    }

    let mut out = Vec::new();
    for word in [0x9504_12de, 0, count as u32, sources as u32, translations as u32, 0, 0] {
        out.extend(u32::to_le_bytes(word));
    }
    out.extend(tables);
    out.extend(strings);
    out
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
