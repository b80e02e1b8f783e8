//! Value types exchanged at the compositor boundary.
//!
//! [`UploadFile`] is what upload handlers and the storage downloader hand in;
//! [`ImageMergeResult`] is what the compositor hands back. Both are plain
//! owned values: the compositor never mutates its input and builds a fresh
//! result per call.

use crate::imaging::Dimensions;
use serde::Serialize;
use std::path::Path;

/// MIME types the compositor accepts as input.
pub const SUPPORTED_INPUT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Extension → MIME type table used when reading files from disk.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// Binary payload plus the metadata the upload layer declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    /// Size in bytes as declared by the producer.
    pub size: u64,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
            size,
        }
    }

    /// Read a file from disk, inferring the MIME type from its extension.
    ///
    /// Unknown extensions get `application/octet-stream`; rejecting them is
    /// left to validation.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime_type_from_path(path), data))
    }
}

/// MIME type for a path based on its extension.
pub fn mime_type_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| {
            EXTENSION_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|(_, mime)| *mime)
        })
        .unwrap_or("application/octet-stream")
}

/// Whether a path has an extension the compositor can take as input.
pub fn is_supported_input(path: &Path) -> bool {
    SUPPORTED_INPUT_TYPES.contains(&mime_type_from_path(path))
}

/// Encoded output of a compositor call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMergeResult {
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
    pub dimensions: Dimensions,
}
