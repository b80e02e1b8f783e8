//! The photo-booth compositor.
//!
//! Combines the pure calculations with backend execution. Every call runs the
//! same fixed chain:
//!
//! ```text
//! validate → identify main → pick canvas → decode main → fill-resize (if needed)
//!          → [merge]  decode logo → contain-resize → composite bottom-right
//!          → [border] extend with white
//!          → encode
//! ```
//!
//! Validation failures are returned as-is so callers can tell bad input from
//! processing failures. Everything after validation is collapsed into a single
//! [`CompositorError::Merge`] or [`CompositorError::Border`] carrying the
//! underlying message.

use super::backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
use super::calculations::{
    LOGO_MARGIN, calculate_bordered_dimensions, calculate_logo_position,
    calculate_target_dimensions,
};
use super::params::{
    BorderParams, EncodeParams, FitMode, MergeOptions, MergeOverrides, ResizeParams,
};
use super::rust_backend::RustBackend;
use crate::upload::{ImageMergeResult, SUPPORTED_INPUT_TYPES, UploadFile};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image file data is empty")]
    EmptyData,
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
}

#[derive(Error, Debug)]
pub enum CompositorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to read image metadata: {0}")]
    Metadata(#[source] BackendError),
    #[error("Failed to merge images: {0}")]
    Merge(String),
    #[error("Failed to add white border: {0}")]
    Border(String),
}

impl CompositorError {
    /// True for errors caused by the input files rather than by processing.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Check that a file is non-empty and of a supported image type.
pub fn validate_image_file(file: &UploadFile) -> Result<(), ValidationError> {
    if file.data.is_empty() {
        return Err(ValidationError::EmptyData);
    }
    if !SUPPORTED_INPUT_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ValidationError::UnsupportedType(file.mime_type.clone()));
    }
    Ok(())
}

/// Create a compositor on the production backend with stock defaults.
pub fn create_compositor() -> Compositor {
    Compositor::new()
}

/// Merges photos with logos and frames them with a white border.
///
/// Holds only its default [`MergeOptions`] and a stateless backend, so one
/// instance can serve concurrent requests and separate instances never
/// influence each other.
pub struct Compositor<B: ImageBackend = RustBackend> {
    backend: B,
    defaults: MergeOptions,
}

impl Compositor<RustBackend> {
    pub fn new() -> Self {
        Self::with_defaults(MergeOptions::default())
    }

    pub fn with_defaults(defaults: MergeOptions) -> Self {
        Self::with_backend(RustBackend::new(), defaults)
    }
}

impl Default for Compositor<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> Compositor<B> {
    pub fn with_backend(backend: B, defaults: MergeOptions) -> Self {
        Self { backend, defaults }
    }

    pub fn defaults(&self) -> &MergeOptions {
        &self.defaults
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Instance defaults with per-call overrides applied.
    pub fn resolve_options(&self, overrides: Option<&MergeOverrides>) -> MergeOptions {
        match overrides {
            Some(o) => self.defaults.with_overrides(o),
            None => self.defaults,
        }
    }

    /// Probe dimensions and codec metadata without decoding pixels.
    pub fn get_image_metadata(&self, file: &UploadFile) -> Result<ImageMetadata, CompositorError> {
        self.backend
            .identify(&file.data)
            .map_err(CompositorError::Metadata)
    }

    /// Fit `main` onto the fixed canvas and stamp `logo` in the bottom-right corner.
    ///
    /// The reported dimensions are the content canvas; no border is added.
    #[tracing::instrument(level = "debug", skip_all, fields(main = %main.name, logo = %logo.name))]
    pub fn merge_images(
        &self,
        main: &UploadFile,
        logo: &UploadFile,
        overrides: Option<&MergeOverrides>,
    ) -> Result<ImageMergeResult, CompositorError> {
        validate_image_file(main)?;
        validate_image_file(logo)?;
        let options = self.resolve_options(overrides);

        self.run_merge(main, logo, &options).map_err(|e| {
            let message = e.describe();
            error!("Image merge error: {message}");
            CompositorError::Merge(message)
        })
    }

    /// Fit `main` onto the fixed canvas and surround it with a white border.
    ///
    /// The reported dimensions include the border.
    #[tracing::instrument(level = "debug", skip_all, fields(main = %main.name))]
    pub fn add_white_border(
        &self,
        main: &UploadFile,
        overrides: Option<&MergeOverrides>,
    ) -> Result<ImageMergeResult, CompositorError> {
        validate_image_file(main)?;
        let options = self.resolve_options(overrides);

        self.run_border(main, &options).map_err(|e| {
            let message = e.describe();
            error!("Add white border error: {message}");
            CompositorError::Border(message)
        })
    }

    fn run_merge(
        &self,
        main: &UploadFile,
        logo: &UploadFile,
        options: &MergeOptions,
    ) -> Result<ImageMergeResult, BackendError> {
        let (canvas, target) = self.prepare_canvas(main)?;

        let logo_image = self.backend.decode(&logo.data)?;
        let logo_image = self.backend.resize(
            logo_image,
            &ResizeParams {
                width: options.logo_size.width,
                height: options.logo_size.height,
                fit: FitMode::Contain,
            },
        )?;

        let (x, y) = calculate_logo_position(
            target,
            self.backend.dimensions(&logo_image),
            LOGO_MARGIN,
        );
        debug!(x, y, "compositing logo");
        let composed = self.backend.composite(canvas, &logo_image, x, y)?;

        self.finish(&composed, options, target)
    }

    fn run_border(
        &self,
        main: &UploadFile,
        options: &MergeOptions,
    ) -> Result<ImageMergeResult, BackendError> {
        let (canvas, target) = self.prepare_canvas(main)?;

        let framed = if options.border_width > 0 {
            self.backend
                .extend(canvas, &BorderParams::white(options.border_width))?
        } else {
            canvas
        };

        self.finish(
            &framed,
            options,
            calculate_bordered_dimensions(target, options.border_width),
        )
    }

    /// Decode the main image and bring it to the fixed content canvas.
    fn prepare_canvas(&self, main: &UploadFile) -> Result<(B::Image, Dimensions), BackendError> {
        let metadata = self.backend.identify(&main.data)?;
        let probed = Some(metadata.dimensions()).filter(|d| d.width > 0 && d.height > 0);
        let target = calculate_target_dimensions(probed);

        let image = self.backend.decode(&main.data)?;
        let current = self.backend.dimensions(&image);
        if current == target {
            debug!(%target, "main image already matches canvas, skipping resize");
            return Ok((image, target));
        }

        debug!(from = %current, to = %target, "fill-resizing main image");
        let resized = self.backend.resize(
            image,
            &ResizeParams {
                width: target.width,
                height: target.height,
                fit: FitMode::Fill,
            },
        )?;
        Ok((resized, target))
    }

    fn finish(
        &self,
        image: &B::Image,
        options: &MergeOptions,
        dimensions: Dimensions,
    ) -> Result<ImageMergeResult, BackendError> {
        let data = self.backend.encode(
            image,
            &EncodeParams {
                format: options.output_format,
                quality: options.quality,
            },
        )?;
        Ok(ImageMergeResult {
            data,
            mime_type: options.output_format.mime_type().to_string(),
            dimensions,
        })
    }
}
