//! # boothframe
//!
//! The imaging core of an event photo-booth service: every guest photo is
//! brought onto one of two fixed canvases, optionally stamped with the event
//! logo, optionally framed with a white border, and re-encoded.
//!
//! ```text
//! UploadFile ─┬─ validate ─ identify ─ pick canvas ─ fill-resize ─┬─ logo ──── encode ─→ ImageMergeResult
//!             │                                                  └─ border ─┘
//! logo ───────┴─ validate ─ decode ─ contain-resize ─────────────┘
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Compositor, codec backend trait, dimension math, options |
//! | [`upload`] | `UploadFile` / `ImageMergeResult` value types, MIME inference |
//! | [`config`] | `boothframe.toml` loading, merging, validation |
//! | [`batch`] | Parallel processing of a directory of photos |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Two Fixed Canvases
//!
//! Output content is always 1248×832 or 832×1248, chosen by orientation alone.
//! Photos are stretched ("fill") rather than cropped, so nothing a guest framed
//! is lost and downstream print templates only ever see two layouts.
//!
//! ## Backend Trait
//!
//! The [`imaging::Compositor`] only talks to [`imaging::ImageBackend`]. The
//! production [`imaging::RustBackend`] is built on the `image` crate; unit
//! tests use a recording mock so pipeline decisions (skipped resizes, logo
//! placement, encode parameters) are asserted without touching pixels.
//!
//! ## Errors Callers Can Map
//!
//! Bad input ([`imaging::ValidationError`]) is returned untouched; anything
//! that fails after validation is collapsed into one wrapped error per
//! operation. Route handlers map the former to 400 and the latter to 500.
//!
//! # Example
//!
//! ```no_run
//! use boothframe::imaging::{MergeOverrides, create_compositor};
//! use boothframe::upload::UploadFile;
//!
//! let photo = UploadFile::from_path("guest.jpg".as_ref())?;
//! let logo = UploadFile::from_path("event-logo.png".as_ref())?;
//!
//! let merged = create_compositor().merge_images(&photo, &logo, None)?;
//! assert_eq!(merged.mime_type, "image/jpeg");
//!
//! let overrides = MergeOverrides { border_width: Some(10), ..Default::default() };
//! let framed = create_compositor().add_white_border(&photo, Some(&overrides))?;
//! println!("{}", framed.dimensions);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
