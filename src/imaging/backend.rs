//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the narrow codec interface the compositor is
//! written against: identify, decode, resize (fill or contain), composite,
//! extend (border), and encode. The backend owns its in-memory image
//! representation through the associated [`ImageBackend::Image`] type, so the
//! compositor never touches pixels directly.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) on the `image` crate.

use super::params::{BorderParams, EncodeParams, ResizeParams};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
    #[error("{0}")]
    ProcessingFailed(String),
    /// A failure that carried no description.
    #[error("")]
    Unknown,
}

impl BackendError {
    /// Message used when wrapping this error, `"Unknown error"` when there is none.
    pub fn describe(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }
}

/// Pixel dimensions of an image or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Header-level information about an encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Container detected from the bytes (`jpeg`, `png`, `webp`, ...).
    pub format: Option<String>,
    /// Decoder color type, e.g. `Rgb8` or `Rgba8`.
    pub color_type: String,
    pub has_alpha: bool,
}

impl ImageMetadata {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Trait for image processing backends.
///
/// Operations take and return owned images so each step of a pipeline can
/// reuse or drop the previous buffer. Implementations must be `Sync`: one
/// backend serves concurrent compositor calls.
pub trait ImageBackend: Sync {
    /// In-memory image handle.
    type Image;

    /// Read dimensions and codec metadata without decoding pixels.
    fn identify(&self, data: &[u8]) -> Result<ImageMetadata, BackendError>;

    /// Decode an encoded buffer.
    fn decode(&self, data: &[u8]) -> Result<Self::Image, BackendError>;

    /// Current size of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resize to the given box using the requested fit mode.
    fn resize(&self, image: Self::Image, params: &ResizeParams)
    -> Result<Self::Image, BackendError>;

    /// Alpha-composite `overlay` onto `base` with its top-left corner at `(x, y)`.
    fn composite(
        &self,
        base: Self::Image,
        overlay: &Self::Image,
        x: u32,
        y: u32,
    ) -> Result<Self::Image, BackendError>;

    /// Grow the canvas by `params.width` on every side, filled with `params.color`.
    fn extend(&self, image: Self::Image, params: &BorderParams)
    -> Result<Self::Image, BackendError>;

    /// Encode to the requested format.
    fn encode(&self, image: &Self::Image, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
