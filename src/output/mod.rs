//! Output writers for reports, timing trees and per-run artifacts.
//!
//! This module handles writing data to disk in various formats:
//! - JSON aggregate reports and timing trees
//! - HTML and SVG flame charts, plain text listings
//! - Copies of the run's own directories

pub mod json;
pub mod run_files;
pub mod text;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use json::{read_report, write_report, write_tree_json};
pub use run_files::{copy_run_dirs, format_taxid_counts, write_flame_files, write_run_artifacts};
pub use text::write_text_file;

/// Validate an output file path and create its parent directories
///
/// # Errors
/// * `OutputError::InvalidPath` - path is empty, is a directory, or its
///   parent cannot be created
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// File size in bytes, zero when unreadable
pub(crate) fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
