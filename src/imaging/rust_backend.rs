//! Image processing backend on the `image` crate, with libwebp for lossy WebP.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_decoder` (header only) |
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader::decode`, format sniffed from bytes |
//! | Fill resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Contain resize | `resize_exact` to the fitted size + `imageops::overlay` onto a transparent box |
//! | Composite / border | `image::imageops::overlay` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `webp::Encoder` (lossy, quality 1–100) |

use super::backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
use super::calculations::{calculate_centered_offset, calculate_contain_dimensions};
use super::params::{BorderParams, EncodeParams, FitMode, OutputFormat, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a reader over an in-memory buffer with the container sniffed from its magic bytes.
fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

/// Largest RGBA buffer any operation may allocate (400 MB).
pub const MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// Reject sizes that are empty or whose pixel buffer would exceed [`MAX_CANVAS_PIXELS`].
///
/// Must run before anything is allocated: `image` panics when a buffer
/// length overflows `usize`.
fn ensure_allocatable(width: u32, height: u32, what: &str) -> Result<(), BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Cannot {what} to empty size {width}x{height}"
        )));
    }
    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(BackendError::ProcessingFailed(format!(
            "Cannot {what} to {width}x{height}: exceeds the {MAX_CANVAS_PIXELS} pixel limit"
        )));
    }
    Ok(())
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn identify(&self, data: &[u8]) -> Result<ImageMetadata, BackendError> {
        let reader = reader(data)?;
        let format = reader.format().map(|f| format!("{f:?}").to_lowercase());
        let decoder = reader
            .into_decoder()
            .map_err(|e| BackendError::Decode(format!("Failed to read image header: {e}")))?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        Ok(ImageMetadata {
            width,
            height,
            format,
            color_type: format!("{color_type:?}"),
            has_alpha: color_type.has_alpha(),
        })
    }

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        reader(data)?
            .decode()
            .map_err(|e| BackendError::Decode(format!("Failed to decode image: {e}")))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions {
            width: image.width(),
            height: image.height(),
        }
    }

    fn resize(
        &self,
        image: DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        ensure_allocatable(params.width, params.height, "resize")?;

        match params.fit {
            FitMode::Fill => {
                Ok(image.resize_exact(params.width, params.height, FilterType::Lanczos3))
            }
            FitMode::Contain => {
                let bounds = Dimensions {
                    width: params.width,
                    height: params.height,
                };
                let fitted = calculate_contain_dimensions(self.dimensions(&image), bounds);
                let resized = image
                    .resize_exact(fitted.width, fitted.height, FilterType::Lanczos3)
                    .into_rgba8();

                // Transparent letterbox around the fitted logo
                let mut canvas = RgbaImage::new(bounds.width, bounds.height);
                let (x, y) = calculate_centered_offset(bounds, fitted);
                imageops::overlay(&mut canvas, &resized, x as i64, y as i64);
                Ok(DynamicImage::ImageRgba8(canvas))
            }
        }
    }

    fn composite(
        &self,
        base: DynamicImage,
        overlay: &DynamicImage,
        x: u32,
        y: u32,
    ) -> Result<DynamicImage, BackendError> {
        let mut canvas = base.into_rgba8();
        imageops::overlay(&mut canvas, &overlay.to_rgba8(), x as i64, y as i64);
        Ok(DynamicImage::ImageRgba8(canvas))
    }

    fn extend(
        &self,
        image: DynamicImage,
        params: &BorderParams,
    ) -> Result<DynamicImage, BackendError> {
        let border = params.width;
        let width = image.width().checked_add(border.saturating_mul(2));
        let height = image.height().checked_add(border.saturating_mul(2));
        let (Some(width), Some(height)) = (width, height) else {
            return Err(BackendError::ProcessingFailed(format!(
                "Border of {border}px overflows the canvas"
            )));
        };
        ensure_allocatable(width, height, "extend")?;

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba(params.color));
        imageops::overlay(&mut canvas, &image.into_rgba8(), border as i64, border as i64);
        Ok(DynamicImage::ImageRgba8(canvas))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, BackendError> {
        let quality = params.quality.value();
        let failed = |e: String| {
            BackendError::Encode(format!("{} encode failed: {e}", params.format.name()))
        };

        match params.format {
            OutputFormat::Jpeg => {
                let mut buf = Vec::new();
                // JPEG has no alpha channel
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality as u8);
                image
                    .to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| failed(e.to_string()))?;
                Ok(buf)
            }
            OutputFormat::Png => {
                let mut buf = Vec::new();
                image
                    .write_with_encoder(PngEncoder::new(&mut buf))
                    .map_err(|e| failed(e.to_string()))?;
                Ok(buf)
            }
            OutputFormat::Webp => {
                let rgba = image.to_rgba8();
                let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                    .encode_simple(false, quality as f32)
                    .map_err(|e| failed(format!("{e:?}")))?;
                Ok(encoded.to_vec())
            }
        }
    }
}
