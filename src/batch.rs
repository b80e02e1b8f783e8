//! Batch processing of a directory of photos.
//!
//! Discovers supported images under a root, runs every file through the
//! compositor, and writes the encoded results into an output directory that
//! mirrors the source layout:
//!
//! ```text
//! shoot/                      out/
//! ├── 001.jpg         →       ├── 001.jpg
//! ├── 002.png         →       ├── 002.jpg
//! └── booth-2/                └── booth-2/
//!     └── 003.webp    →           └── 003.jpg
//! ```
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel with [rayon](https://docs.rs/rayon); each
//! file is still a single sequential compositor call. A failing file is
//! recorded in the [`BatchReport`] and does not stop the others.

use crate::imaging::{Compositor, Dimensions, ImageBackend, MergeOverrides, OutputFormat};
use crate::upload::{UploadFile, is_supported_input};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What to do with each discovered photo.
#[derive(Debug, Clone, Copy)]
pub enum BatchMode<'a> {
    /// `add_white_border` on every photo.
    Border,
    /// `merge_images` every photo with the same logo.
    Merge { logo: &'a UploadFile },
}

/// Result of processing one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchOutcome {
    Written {
        output: PathBuf,
        dimensions: Dimensions,
        bytes: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub source: PathBuf,
    pub outcome: BatchOutcome,
}

/// Per-file results, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, BatchOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// Find supported photos under `root`, sorted by path.
///
/// Only the top level is scanned unless `recursive` is set. Files whose
/// extension is not a supported input type are skipped.
pub fn discover_images(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, BatchError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Output location for `source`: same relative path under `output_dir`,
/// extension replaced by the output format's.
pub fn output_path_for(
    source: &Path,
    source_root: &Path,
    output_dir: &Path,
    format: OutputFormat,
) -> PathBuf {
    let relative = source.strip_prefix(source_root).unwrap_or(source);
    output_dir
        .join(relative)
        .with_extension(format.extension())
}

/// Run every source through the compositor in parallel and write the results.
///
/// Sources that would land on an output path already claimed by an earlier
/// source (e.g. `001.jpg` and `001.png`) are not processed and are reported
/// as failed.
pub fn run_batch<B: ImageBackend>(
    compositor: &Compositor<B>,
    sources: &[PathBuf],
    source_root: &Path,
    output_dir: &Path,
    mode: BatchMode<'_>,
    overrides: Option<&MergeOverrides>,
) -> Result<BatchReport, BatchError> {
    std::fs::create_dir_all(output_dir)?;
    let format = compositor.resolve_options(overrides).output_format;
    let planned = plan_outputs(sources, source_root, output_dir, format);

    let items = planned
        .into_par_iter()
        .map(|(source, output)| {
            let outcome = match output.and_then(|output| {
                process_one(compositor, source, &output, mode, overrides)
                    .map(|written| (output, written))
            }) {
                Ok((output, (dimensions, bytes))) => {
                    info!(source = %source.display(), output = %output.display(), "written");
                    BatchOutcome::Written {
                        output,
                        dimensions,
                        bytes,
                    }
                }
                Err(error) => {
                    warn!(source = %source.display(), %error, "batch item failed");
                    BatchOutcome::Failed { error }
                }
            };
            BatchItem {
                source: source.clone(),
                outcome,
            }
        })
        .collect();

    Ok(BatchReport { items })
}

/// Pair each source with its output path, or with an error when an earlier
/// source already claimed that path.
fn plan_outputs<'a>(
    sources: &'a [PathBuf],
    source_root: &Path,
    output_dir: &Path,
    format: OutputFormat,
) -> Vec<(&'a PathBuf, Result<PathBuf, String>)> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    sources
        .iter()
        .map(|source| {
            let output = output_path_for(source, source_root, output_dir, format);
            let planned = match claimed.entry(output.clone()) {
                Entry::Occupied(first) => Err(format!(
                    "Output {} collides with {}",
                    output.display(),
                    first.get().display()
                )),
                Entry::Vacant(slot) => {
                    slot.insert(source);
                    Ok(output)
                }
            };
            (source, planned)
        })
        .collect()
}

fn process_one<B: ImageBackend>(
    compositor: &Compositor<B>,
    source: &Path,
    output: &Path,
    mode: BatchMode<'_>,
    overrides: Option<&MergeOverrides>,
) -> Result<(Dimensions, usize), String> {
    let file = UploadFile::from_path(source).map_err(|e| e.to_string())?;
    let result = match mode {
        BatchMode::Border => compositor.add_white_border(&file, overrides),
        BatchMode::Merge { logo } => compositor.merge_images(&file, logo, overrides),
    }
    .map_err(|e| e.to_string())?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(output, &result.data).map_err(|e| e.to_string())?;
    Ok((result.dimensions, result.data.len()))
}
