//! Service configuration module.
//!
//! Handles loading and validating `config.toml`. Stock defaults are the base
//! layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! root = "uploads"          # Storage root for all asset classes
//! images_dir = "images"     # Flat directory of images under the root
//!
//! [limits]
//! max_dimension = 16384     # Largest accepted target width or height
//!
//! [processing]
//! max_processes = 4         # Max parallel workers for `batch` (omit for auto = CPU cores)
//!
//! [settings]
//! path = "data/settings.json"  # Key-value settings store
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Where stored files live.
    pub storage: StorageConfig,
    /// Bounds on what a resize request may ask for.
    pub limits: LimitsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Location of the key-value settings store.
    pub settings: SettingsConfig,
}

impl ServiceConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.root must not be empty".into(),
            ));
        }
        let images_dir = Path::new(&self.storage.images_dir);
        let single_component = images_dir.components().count() == 1
            && matches!(
                images_dir.components().next(),
                Some(std::path::Component::Normal(_))
            );
        if !single_component {
            return Err(ConfigError::Validation(
                "storage.images_dir must be a single directory name".into(),
            ));
        }
        if self.limits.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "limits.max_dimension must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Storage layout: `<root>/<images_dir>/<filename>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub images_dir: String,
}

impl StorageConfig {
    /// Directory holding the image asset class.
    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            images_dir: "images".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest accepted target width or height, in pixels.
    pub max_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_dimension: 16384,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel resize workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    /// JSON file backing the key-value settings store.
    pub path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/settings.json"),
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ServiceConfig::default()).expect("default config must serialize")
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
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
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
pub fn load_config(dir: &Path) -> Result<ServiceConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: ServiceConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cdn-resize Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Root directory for stored assets.
root = "uploads"

# Flat directory (under root) holding images. Filenames are the only key.
images_dir = "images"

# ---------------------------------------------------------------------------
# Request limits
# ---------------------------------------------------------------------------
[limits]
# Largest accepted target width or height, in pixels.
max_dimension = 16384

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel resize workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Settings store
# ---------------------------------------------------------------------------
[settings]
# JSON file holding registration_enabled and access_token_ttl.
path = "data/settings.json"
"##
}
