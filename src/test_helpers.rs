//! Shared test utilities for the boothframe test suite.
//!
//! Fixture images are generated in memory so tests need no files on disk.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let main = jpeg_upload("photo.jpg", 1920, 1080);
//! let logo = png_upload("logo.png", 200, 200);
//! let result = create_compositor().merge_images(&main, &logo, None).unwrap();
//! assert_eq!(decode_bytes(&result.data).width(), 1248);
//! ```

use crate::upload::UploadFile;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Encoded fixtures
// =========================================================================

/// Gradient JPEG of the given size.
pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// RGBA PNG: an opaque red disc-ish square on a transparent background.
pub fn encode_png_rgba(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= width / 4 && x < width * 3 / 4 && y >= height / 4 && y < height * 3 / 4;
        if inside {
            Rgba([220, 30, 30, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

pub fn jpeg_upload(name: &str, width: u32, height: u32) -> UploadFile {
    UploadFile::new(name, "image/jpeg", encode_jpeg(width, height))
}

pub fn png_upload(name: &str, width: u32, height: u32) -> UploadFile {
    UploadFile::new(name, "image/png", encode_png_rgba(width, height))
}

/// Write a JPEG fixture to disk.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, encode_jpeg(width, height)).unwrap();
}

// =========================================================================
// Assertions
// =========================================================================

/// Decode an encoded buffer, panicking with the sniffed format on failure.
pub fn decode_bytes(data: &[u8]) -> DynamicImage {
    image::load_from_memory(data).unwrap_or_else(|e| {
        let format = image::guess_format(data).ok();
        panic!("output did not decode ({format:?}): {e}")
    })
}
