//! Writer configuration module.
//!
//! Handles loading, validating, and merging `htmlnav.toml`. User values are
//! layered over stock defaults, and command-line flags are applied last by
//! the caller.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! stylesheet_path = "default.css"  # Favicon and navigation.css live next to it
//! lang = "en"                       # <html lang="...">
//!
//! [images]
//! introspect = true                 # Read natural image size when scaling
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "htmlnav.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Writer configuration loaded from `htmlnav.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// Stylesheet linked from every page. Its directory also holds
    /// `favicon.png` and `navigation.css`.
    pub stylesheet_path: String,
    /// Value of the `lang` attribute on `<html>`.
    pub lang: String,
    pub images: ImagesConfig,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            stylesheet_path: "default.css".to_string(),
            lang: "en".to_string(),
            images: ImagesConfig::default(),
        }
    }
}

impl WriterConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stylesheet_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "stylesheet_path must not be empty".into(),
            ));
        }
        if self.lang.trim().is_empty() {
            return Err(ConfigError::Validation("lang must not be empty".into()));
        }
        Ok(())
    }
}

/// Image handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Read image files for their natural size when a scale is given
    /// without explicit dimensions.
    pub introspect: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { introspect: true }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(WriterConfig::default()).expect("default config must serialize")
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

/// Load `htmlnav.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<WriterConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: WriterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `htmlnav.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<WriterConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `htmlnav.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# htmlnav configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Stylesheet linked from every page, relative to the working directory.
# favicon.png and navigation.css are expected in the same directory.
stylesheet_path = "default.css"

# Language of the generated pages (<html lang="...">).
lang = "en"

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# When an image has a scale but no width or height, read the file to find
# its natural size. Disable for documents whose images are not on disk.
introspect = true
"##
}
