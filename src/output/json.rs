//! JSON report and timing tree writers.
//!
//! Writes serializable structs to JSON files with pretty formatting.

use super::{file_size, prepare_output_path};
use crate::aggregator::timing_tree::TimingNode;
use crate::parser::schema::AggregateReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the aggregate report to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &AggregateReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());
    write_pretty(report, output_path)?;
    info!(
        "Report written successfully ({} runs, {} bytes)",
        report.runs.len(),
        file_size(output_path)
    );

    Ok(())
}

/// Write a timing tree in its nested name/value/children form
pub fn write_tree_json(tree: &TimingNode, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    debug!("Writing timing tree to: {}", output_path.display());
    write_pretty(&tree.to_flame(), output_path)
}

fn write_pretty<T: Serialize>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    Ok(())
}

/// Read an aggregate report from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<AggregateReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path)?;
    let report: AggregateReport = serde_json::from_reader(std::io::BufReader::new(file))?;

    debug!(
        "Report loaded: version {}, {} runs",
        report.version,
        report.runs.len()
    );

    Ok(report)
}
