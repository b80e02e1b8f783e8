//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`compositor`](super::compositor) (which decides the
//! canvas size, logo box, and output codec) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing compositor logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: Output codec (jpeg, png, webp) and its MIME type.
//! - [`FitMode`]: How a resize maps the source onto the target box.
//! - [`MergeOptions`]: Fully resolved options for one compositor call.
//! - [`MergeOverrides`]: Caller-supplied partial options, merged over the defaults.
//! - [`ResizeParams`], [`BorderParams`], [`EncodeParams`]: Backend instructions.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Upper bound for a border width coming from a config file or the command line.
pub const MAX_BORDER_WIDTH: u32 = 512;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Output container/codec.
///
/// Parsing is lenient: any name other than `jpeg`, `png` or `webp` resolves to
/// [`OutputFormat::Jpeg`]. Use [`OutputFormat::parse_strict`] where an unknown
/// name should be reported instead (config files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// Exact lookup; `None` for names outside the supported set.
    pub fn parse_strict(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Lookup with the JPEG fallback.
    pub fn parse_lenient(name: &str) -> Self {
        Self::parse_strict(name).unwrap_or_else(|| {
            tracing::warn!(requested = name, "unknown output format, encoding as jpeg");
            Self::Jpeg
        })
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used when the CLI derives output paths.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&name))
    }
}

/// How a resize maps the source onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Stretch to exactly the target, ignoring aspect ratio.
    Fill,
    /// Fit inside the target preserving aspect ratio, pad the rest with transparency.
    Contain,
}

/// Bounding box for the logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoSize {
    pub width: u32,
    pub height: u32,
}

impl Default for LogoSize {
    fn default() -> Self {
        Self {
            width: 180,
            height: 180,
        }
    }
}

impl std::fmt::Display for LogoSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for LogoSize {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `180x180`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width in '{s}'"))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height in '{s}'"))?;
        Ok(Self { width, height })
    }
}

/// Fully resolved options for a compositor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub logo_size: LogoSize,
    pub border_width: u32,
    pub quality: Quality,
    pub output_format: OutputFormat,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            logo_size: LogoSize::default(),
            border_width: 7,
            quality: Quality::default(),
            output_format: OutputFormat::Jpeg,
        }
    }
}

impl MergeOptions {
    /// Apply caller overrides on top of these options.
    ///
    /// Fields set in `overrides` replace the current value; unset fields are kept.
    pub fn with_overrides(&self, overrides: &MergeOverrides) -> Self {
        Self {
            logo_size: overrides.logo_size.unwrap_or(self.logo_size),
            border_width: overrides.border_width.unwrap_or(self.border_width),
            quality: overrides.quality.map(Quality::new).unwrap_or(self.quality),
            output_format: overrides.output_format.unwrap_or(self.output_format),
        }
    }
}

/// Partial options supplied per call, e.g. from a request body.
///
/// Accepts both snake_case and the camelCase names used by web clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MergeOverrides {
    #[serde(default, alias = "logoSize")]
    pub logo_size: Option<LogoSize>,
    #[serde(default, alias = "borderWidth")]
    pub border_width: Option<u32>,
    #[serde(default)]
    pub quality: Option<u32>,
    #[serde(default, alias = "outputFormat")]
    pub output_format: Option<OutputFormat>,
}

/// A caller-supplied option outside the range the compositor accepts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("quality must be 1-100 (got {0})")]
    Quality(u32),
    #[error("logo_size values must be non-zero (got {0})")]
    LogoSize(LogoSize),
    #[error("border_width must be at most {max} (got {0})", max = MAX_BORDER_WIDTH)]
    BorderWidth(u32),
}

impl MergeOverrides {
    /// Range-check the fields that are set.
    ///
    /// The compositor clamps quality and only bounds pixel buffers. Config
    /// files and CLI flags are checked with this before any processing.
    pub fn validate(&self) -> Result<(), OptionError> {
        if let Some(quality) = self.quality.filter(|q| !(1..=100).contains(q)) {
            return Err(OptionError::Quality(quality));
        }
        if let Some(size) = self.logo_size.filter(|s| s.width == 0 || s.height == 0) {
            return Err(OptionError::LogoSize(size));
        }
        if let Some(border) = self.border_width.filter(|&b| b > MAX_BORDER_WIDTH) {
            return Err(OptionError::BorderWidth(border));
        }
        Ok(())
    }
}

/// Parameters for a resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub fit: FitMode,
}

/// Parameters for extending a canvas with a uniform border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderParams {
    pub width: u32,
    /// RGBA fill color.
    pub color: [u8; 4],
}

impl BorderParams {
    pub fn white(width: u32) -> Self {
        Self {
            width,
            color: [255, 255, 255, 255],
        }
    }
}

/// Parameters for the final encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}
