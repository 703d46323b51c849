//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading pipeline logs
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while resolving a run directory
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Run directory does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Failed to find sample name for directory {0}")]
    NoSampleName(PathBuf),

    #[error("Required file is missing: {0}")]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

/// Errors raised by the stage lookup table
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Unknown stage name: {0:?}")]
    UnknownStage(String),
}

/// Errors that can occur while loading or querying the taxonomy
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("IO error reading {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed line {line} in {file}: {reason}")]
    MalformedLine {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Unknown tax id: {0}")]
    UnknownTaxId(u32),

    #[error("Lineage of tax id {0} does not reach the root")]
    LineageCycle(u32),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Timing tree has no measurable time")]
    EmptyTree,

    #[error("Failed to render flamegraph: {0}")]
    RenderFailed(String),

    #[error("Failed to serialize timing tree: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Flamegraph(#[from] FlamegraphError),
}
