//! Compositor configuration.
//!
//! Handles loading, validating, and merging `boothframe.toml`. Stock defaults
//! are the base layer; a user config file overrides any subset of keys; CLI
//! flags override both (applied as [`MergeOverrides`](crate::imaging::MergeOverrides)).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [merge]
//! logo_size = { width = 180, height = 180 }  # Box the logo is fit into
//! border_width = 7                          # White border in pixels
//! quality = 90                              # JPEG quality (1-100)
//! output_format = "jpeg"                    # jpeg | png | webp
//!
//! [processing]
//! max_processes = 4         # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{LogoSize, MergeOptions, MergeOverrides, OutputFormat, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// Configuration loaded from `boothframe.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    /// Default options for merge and border operations.
    pub merge: MergeConfig,
    /// Parallel batch settings.
    pub processing: ProcessingConfig,
}

/// `[merge]` section. Mirrors [`MergeOptions`] with config-file types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    pub logo_size: LogoSize,
    pub border_width: u32,
    pub quality: u32,
    /// Kept as a string so unknown names can be reported instead of silently mapped.
    pub output_format: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        let stock = MergeOptions::default();
        Self {
            logo_size: stock.logo_size,
            border_width: stock.border_width,
            quality: stock.quality.value(),
            output_format: stock.output_format.name().to_string(),
        }
    }
}

impl MergeConfig {
    /// Resolved compositor defaults. Call after [`BoothConfig::validate`].
    pub fn to_options(&self) -> MergeOptions {
        MergeOptions {
            logo_size: self.logo_size,
            border_width: self.border_width,
            quality: Quality::new(self.quality),
            output_format: OutputFormat::parse_lenient(&self.output_format),
        }
    }

    /// The numeric fields as overrides, for the shared range checks.
    fn as_overrides(&self) -> MergeOverrides {
        MergeOverrides {
            logo_size: Some(self.logo_size),
            border_width: Some(self.border_width),
            quality: Some(self.quality),
            output_format: None,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

impl BoothConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let merge = &self.merge;
        merge
            .as_overrides()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("merge.{e}")))?;
        if OutputFormat::parse_strict(&merge.output_format).is_none() {
            return Err(ConfigError::Validation(format!(
                "merge.output_format must be one of jpeg, png, webp (got '{}')",
                merge.output_format
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BoothConfig::default()).expect("default config must serialize")
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

/// Merge user TOML text over the stock defaults, then deserialize and validate.
pub fn parse_config(content: &str) -> Result<BoothConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value(), overlay);
    let config: BoothConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// A missing file yields the stock defaults; a present but invalid file is an error.
pub fn load_config(path: &Path) -> Result<BoothConfig, ConfigError> {
    if !path.exists() {
        return Ok(BoothConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `boothframe.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# boothframe configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.
# Command-line flags override these values.

# ---------------------------------------------------------------------------
# Compositing defaults
# ---------------------------------------------------------------------------
[merge]
# Bounding box the logo is fit into (aspect preserved, transparent padding).
logo_size = { width = 180, height = 180 }

# White border added around the canvas by `boothframe border`, in pixels.
border_width = 7

# Encoding quality for JPEG and WebP (1 = worst, 100 = best). PNG is lossless.
quality = 90

# Output format: "jpeg", "png" or "webp".
output_format = "jpeg"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `boothframe batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
