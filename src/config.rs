use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{
    aggregate::{AggregateOptions, DEFAULT_MOD_INFO_TYPE, DEFAULT_MODS_ROOT},
    release::BuildOptions,
    retention::{DEFAULT_TIER_WIDTHS, RetentionPolicy},
    transliterate::PhoneticLocales,
};

pub const CONFIG_FILE_NAME: &str = ".harvestrc.json";

/// Tags whose source archives are known to be broken upstream.
pub const KNOWN_BROKEN_TAGS: &[&str] = &[
    "cdda-experimental-2021-07-09-1837",
    "cdda-experimental-2021-07-09-1719",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_base_pattern")]
    pub base_pattern: String,
    #[serde(default = "default_mods_pattern")]
    pub mods_pattern: String,
    #[serde(default = "default_mods_root")]
    pub mods_root: String,
    #[serde(default = "default_catalog_pattern")]
    pub catalog_pattern: String,
    /// Compiled catalogs, read when `catalogPattern` matches nothing.
    #[serde(default = "default_catalog_fallback_pattern")]
    pub catalog_fallback_pattern: String,
    #[serde(default = "default_mod_info_type")]
    pub mod_info_type: String,
    #[serde(default = "default_skip_obsolete_mods")]
    pub skip_obsolete_mods: bool,
    /// Regex over locale names; matching locales get a phonetic index.
    #[serde(default = "default_phonetic_locale_pattern")]
    pub phonetic_locale_pattern: String,
    #[serde(default = "default_retention_tiers")]
    pub retention_tiers: Vec<u32>,
    #[serde(default = "default_forbidden_tags")]
    pub forbidden_tags: Vec<String>,
    #[serde(default = "default_output_root")]
    pub output_root: String,
}

fn default_base_pattern() -> String {
    "data/json/**/*.json".to_string()
}

fn default_mods_pattern() -> String {
    "data/mods/*/**/*.json".to_string()
}

fn default_mods_root() -> String {
    DEFAULT_MODS_ROOT.to_string()
}

fn default_catalog_pattern() -> String {
    "lang/po/*.po".to_string()
}

fn default_catalog_fallback_pattern() -> String {
    "lang/mo/**/*.mo".to_string()
}

fn default_mod_info_type() -> String {
    DEFAULT_MOD_INFO_TYPE.to_string()
}

fn default_skip_obsolete_mods() -> bool {
    true
}

fn default_phonetic_locale_pattern() -> String {
    "^zh_".to_string()
}

fn default_retention_tiers() -> Vec<u32> {
    DEFAULT_TIER_WIDTHS.to_vec()
}

fn default_forbidden_tags() -> Vec<String> {
    KNOWN_BROKEN_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_output_root() -> String {
    "data".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_pattern: default_base_pattern(),
            mods_pattern: default_mods_pattern(),
            mods_root: default_mods_root(),
            catalog_pattern: default_catalog_pattern(),
            catalog_fallback_pattern: default_catalog_fallback_pattern(),
            mod_info_type: default_mod_info_type(),
            skip_obsolete_mods: default_skip_obsolete_mods(),
            phonetic_locale_pattern: default_phonetic_locale_pattern(),
            retention_tiers: default_retention_tiers(),
            forbidden_tags: default_forbidden_tags(),
            output_root: default_output_root(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Checks the file patterns, the phonetic locale regex and the
    /// retention tier widths.
    pub fn validate(&self) -> Result<()> {
        for (field, pattern) in [
            ("basePattern", &self.base_pattern),
            ("modsPattern", &self.mods_pattern),
            ("catalogPattern", &self.catalog_pattern),
            ("catalogFallbackPattern", &self.catalog_fallback_pattern),
        ] {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in '{}': \"{}\"", field, pattern))?;
        }

        self.phonetic_locales()?;
        self.retention_policy()?;

        Ok(())
    }

    pub fn phonetic_locales(&self) -> Result<PhoneticLocales> {
        PhoneticLocales::new(&self.phonetic_locale_pattern).with_context(|| {
            format!(
                "Invalid regex in 'phoneticLocalePattern': \"{}\"",
                self.phonetic_locale_pattern
            )
        })
    }

    pub fn retention_policy(&self) -> Result<RetentionPolicy> {
        let Ok(widths) = <[u32; 4]>::try_from(self.retention_tiers.as_slice()) else {
            bail!(
                "'retentionTiers' must list exactly 4 tier widths, got {}",
                self.retention_tiers.len()
            );
        };
        if widths.contains(&0) {
            bail!("'retentionTiers' widths must be greater than 0");
        }
        Ok(RetentionPolicy::new(widths))
    }

    pub fn build_options(&self) -> Result<BuildOptions> {
        Ok(BuildOptions {
            base_pattern: self.base_pattern.clone(),
            mods_pattern: self.mods_pattern.clone(),
            catalog_pattern: self.catalog_pattern.clone(),
            catalog_fallback_pattern: self.catalog_fallback_pattern.clone(),
            aggregate: AggregateOptions {
                mods_root: self.mods_root.clone(),
                mod_info_type: self.mod_info_type.clone(),
                skip_obsolete_mods: self.skip_obsolete_mods,
            },
            phonetic: self.phonetic_locales()?,
        })
    }

    pub fn is_forbidden(&self, tag: &str) -> bool {
        self.forbidden_tags.iter().any(|t| t == tag)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
