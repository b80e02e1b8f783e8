//! CLI output formatting.
//!
//! Every command prints a short, information-first summary: what was produced
//! (format and canvas size) leads, file paths follow as indented context.
//! Formatting functions return lines so they can be tested without capturing
//! stdout; the `print_*` wrappers write them.
//!
//! ```text
//! border 1262x846 image/jpeg (184.2 KB)
//!     Source: shoot/001.jpg
//!     Output: out/001.jpg
//! ```

use crate::batch::{BatchOutcome, BatchReport};
use crate::imaging::ImageMetadata;
use crate::upload::ImageMergeResult;
use std::path::Path;

fn human_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Format the result of a single `merge` or `border` run.
pub fn format_result(
    operation: &str,
    result: &ImageMergeResult,
    source: &Path,
    output: &Path,
) -> Vec<String> {
    vec![
        format!(
            "{} {} {} ({})",
            operation,
            result.dimensions,
            result.mime_type,
            human_bytes(result.data.len())
        ),
        format!("    Source: {}", source.display()),
        format!("    Output: {}", output.display()),
    ]
}

/// Format probed metadata for `identify`.
pub fn format_metadata(path: &Path, meta: &ImageMetadata) -> Vec<String> {
    vec![
        format!("{}", path.display()),
        format!("    Size: {}x{}", meta.width, meta.height),
        format!(
            "    Format: {}",
            meta.format.as_deref().unwrap_or("unknown")
        ),
        format!(
            "    Color: {}{}",
            meta.color_type,
            if meta.has_alpha { " (alpha)" } else { "" }
        ),
    ]
}

/// Format a batch report: one line per file, then a summary.
pub fn format_batch_report(report: &BatchReport, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, item) in report.items.iter().enumerate() {
        let source = item
            .source
            .strip_prefix(source_root)
            .unwrap_or(&item.source);
        match &item.outcome {
            BatchOutcome::Written {
                output,
                dimensions,
                bytes,
            } => {
                lines.push(format!(
                    "{:03} {} → {} ({})",
                    i + 1,
                    source.display(),
                    dimensions,
                    human_bytes(*bytes)
                ));
                lines.push(format!("    Output: {}", output.display()));
            }
            BatchOutcome::Failed { error } => {
                lines.push(format!("{:03} {} FAILED", i + 1, source.display()));
                lines.push(format!("    Error: {error}"));
            }
        }
    }
    lines.push(format!(
        "{} written, {} failed",
        report.succeeded(),
        report.failed()
    ));
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
