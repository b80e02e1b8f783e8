//! Pure calculation functions for canvas and overlay dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Content canvas for landscape (and square) photos.
pub const LANDSCAPE_CANVAS: Dimensions = Dimensions {
    width: 1248,
    height: 832,
};

/// Content canvas for portrait photos.
pub const PORTRAIT_CANVAS: Dimensions = Dimensions {
    width: 832,
    height: 1248,
};

/// Distance between the logo and the bottom-right corner of the canvas.
pub const LOGO_MARGIN: u32 = 24;

/// Choose the fixed content canvas for a source image.
///
/// Landscape when `width >= height`, portrait otherwise. Unknown dimensions
/// (a probe that could not report a size) default to landscape.
///
/// # Examples
/// ```
/// # use boothframe::imaging::{Dimensions, calculate_target_dimensions};
/// let photo = Dimensions { width: 1920, height: 1080 };
/// assert_eq!(calculate_target_dimensions(Some(photo)).width, 1248);
///
/// let portrait = Dimensions { width: 1080, height: 1920 };
/// assert_eq!(calculate_target_dimensions(Some(portrait)).width, 832);
/// ```
pub fn calculate_target_dimensions(source: Option<Dimensions>) -> Dimensions {
    match source {
        Some(d) if d.width < d.height => PORTRAIT_CANVAS,
        _ => LANDSCAPE_CANVAS,
    }
}

/// Canvas size after adding a uniform border of `border` pixels on every side.
pub fn calculate_bordered_dimensions(content: Dimensions, border: u32) -> Dimensions {
    Dimensions {
        width: content.width.saturating_add(border.saturating_mul(2)),
        height: content.height.saturating_add(border.saturating_mul(2)),
    }
}

/// Largest size that fits inside `bounds` while keeping the source aspect ratio.
///
/// Never returns a zero dimension, so extreme aspect ratios still produce a
/// drawable image.
pub fn calculate_contain_dimensions(source: Dimensions, bounds: Dimensions) -> Dimensions {
    if source.width == 0 || source.height == 0 {
        return bounds;
    }

    let scale_w = bounds.width as f64 / source.width as f64;
    let scale_h = bounds.height as f64 / source.height as f64;
    let scale = scale_w.min(scale_h);

    Dimensions {
        width: ((source.width as f64 * scale).round() as u32).clamp(1, bounds.width.max(1)),
        height: ((source.height as f64 * scale).round() as u32).clamp(1, bounds.height.max(1)),
    }
}

/// Offset that centers `inner` inside `outer`.
pub fn calculate_centered_offset(outer: Dimensions, inner: Dimensions) -> (u32, u32) {
    (
        outer.width.saturating_sub(inner.width) / 2,
        outer.height.saturating_sub(inner.height) / 2,
    )
}

/// Top-left position of the logo: bottom-right corner, inset by `margin`.
///
/// Saturates at 0 when the logo plus margin does not fit.
pub fn calculate_logo_position(canvas: Dimensions, logo: Dimensions, margin: u32) -> (u32, u32) {
    (
        canvas
            .width
            .saturating_sub(logo.width)
            .saturating_sub(margin),
        canvas
            .height
            .saturating_sub(logo.height)
            .saturating_sub(margin),
    )
}
