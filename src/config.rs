//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by whatever the user's file specifies; the file is sparse and
//! only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content"                  # Root that asset paths are relative to
//! catalog = "catalog.json"                  # Asset catalog file
//! state_file = ".thumb-regen-state.json"    # Batch resume cursor
//!
//! [images]
//! quality = 82              # JPEG quality for generated sizes (1-100)
//!
//! [sizes.thumbnail]
//! width = 150
//! height = 150
//! crop = true
//!
//! [sizes.medium]
//! width = 300
//! height = 300
//!
//! [sizes.medium_large]
//! width = 768
//! height = 0                # 0 = unbounded
//!
//! [sizes.large]
//! width = 1024
//! height = 1024
//!
//! [protect]
//! patterns = []             # File-name substrings that are never deleted
//! skip_ids = []             # Assets that are never touched
//! ```
//!
//! Size tables merge key-by-key, so a user file can add a size or tweak one
//! dimension of a stock size without repeating the others. Unknown keys are
//! rejected to catch typos early.

use crate::imaging::{Quality, SizeSpec};
use crate::types::AssetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file inside the working root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegenConfig {
    /// Directory that recorded asset paths are relative to.
    pub content_root: String,
    /// Path of the JSON asset catalog.
    pub catalog: String,
    /// Path of the batch resume state file.
    pub state_file: String,
    /// Encoding settings for generated sizes.
    pub images: ImagesConfig,
    /// Named sizes to generate.
    pub sizes: BTreeMap<String, SizeSpec>,
    /// Files and assets the pipeline must leave alone.
    pub protect: ProtectConfig,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            content_root: "content".to_string(),
            catalog: "catalog.json".to_string(),
            state_file: ".thumb-regen-state.json".to_string(),
            images: ImagesConfig::default(),
            sizes: default_sizes(),
            protect: ProtectConfig::default(),
        }
    }
}

fn default_sizes() -> BTreeMap<String, SizeSpec> {
    BTreeMap::from([
        ("thumbnail".to_string(), SizeSpec::new(150, 150, true)),
        ("medium".to_string(), SizeSpec::new(300, 300, false)),
        ("medium_large".to_string(), SizeSpec::new(768, 0, false)),
        ("large".to_string(), SizeSpec::new(1024, 1024, false)),
    ])
}

impl RegenConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.sizes.is_empty() {
            return Err(ConfigError::Validation("sizes must not be empty".into()));
        }
        for (name, spec) in &self.sizes {
            if spec.width == 0 && spec.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "sizes.{name} needs a non-zero width or height"
                )));
            }
        }
        Ok(())
    }

    /// Resolve a configured path against the working root.
    fn path_in(root: &Path, value: &str) -> PathBuf {
        root.join(value)
    }

    pub fn content_root_path(&self, root: &Path) -> PathBuf {
        Self::path_in(root, &self.content_root)
    }

    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        Self::path_in(root, &self.catalog)
    }

    pub fn state_path(&self, root: &Path) -> PathBuf {
        Self::path_in(root, &self.state_file)
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.images.quality)
    }
}

/// Encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 82 }
    }
}

/// Protection rules, consumed by [`ConfiguredHooks`](crate::hooks::ConfiguredHooks).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtectConfig {
    /// A derivative whose file name contains any of these is never deleted.
    pub patterns: Vec<String>,
    /// Assets that are skipped entirely.
    pub skip_ids: Vec<AssetId>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(RegenConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<RegenConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: RegenConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumb-regen configuration
# =========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory that recorded asset paths are relative to.
content_root = "content"

# JSON asset catalog (ids, mime types, metadata records).
catalog = "catalog.json"

# Where batch runs persist their resume cursor.
state_file = ".thumb-regen-state.json"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[images]
# JPEG quality for generated sizes (1 = worst, 100 = best).
quality = 82

# ---------------------------------------------------------------------------
# Sizes
# ---------------------------------------------------------------------------
# Each size is a bounding box. A 0 dimension is unbounded. With crop = true
# the output fills the box exactly (center crop); otherwise it fits inside.
# Sizes that would not be smaller than the source are skipped.
[sizes.thumbnail]
width = 150
height = 150
crop = true

[sizes.medium]
width = 300
height = 300

[sizes.medium_large]
width = 768
height = 0

[sizes.large]
width = 1024
height = 1024

# ---------------------------------------------------------------------------
# Protection
# ---------------------------------------------------------------------------
[protect]
# Derivatives whose file name contains any of these strings are never deleted.
patterns = []

# Asset ids that are skipped entirely.
skip_ids = []
"##
}
