//! Image processing on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_decoder` (header only) |
//! | **Fill resize** | `resize_exact` with Lanczos3 |
//! | **Contain resize** | Lanczos3 fit + transparent letterbox |
//! | **Logo / border** | `image::imageops::overlay` |
//! | **Encode** | JPEG and WebP (quality), PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for canvas and placement math (unit testable)
//! - **Parameters**: Data structures describing image operations and caller options
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Compositor**: [`Compositor`], combining calculations + backend into the public operations

pub mod backend;
mod calculations;
pub mod compositor;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
pub use calculations::{
    LANDSCAPE_CANVAS, LOGO_MARGIN, PORTRAIT_CANVAS, calculate_bordered_dimensions,
    calculate_target_dimensions,
};
pub use compositor::{
    Compositor, CompositorError, ValidationError, create_compositor, validate_image_file,
};
pub use params::{
    BorderParams, EncodeParams, FitMode, LogoSize, MAX_BORDER_WIDTH, MergeOptions, MergeOverrides,
    OptionError, OutputFormat, Quality, ResizeParams,
};
pub use rust_backend::RustBackend;
