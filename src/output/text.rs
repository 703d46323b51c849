//! Plain text output writer (HTML pages, SVG images, listings).

use super::prepare_output_path;
use crate::utils::error::OutputError;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write text content to a file, creating parent directories
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_text_file(content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;

    debug!(
        "Wrote {} ({:.2} KB)",
        output_path.display(),
        content.len() as f64 / 1024.0
    );

    Ok(())
}
