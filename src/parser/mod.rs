//! Log parsing, run discovery and schema definitions.
//!
//! This module handles:
//! - Extracting timings from the primary log and sub-tool stderr files
//! - Locating the files that belong to a run
//! - Defining output schema

pub mod extractor;
pub mod run_info;
pub mod schema;

// Re-export main types
pub use extractor::{
    extract_bracketed_seconds, extract_cycles, extract_scheduler_walltime,
    extract_simple_seconds, extract_stage_records, parse_output_record, BracketedRecord,
    CycleSpan, OutputRecord, StageRecord, TimedLabel,
};
pub use run_info::{discover_sample_dirs, LogLocation, RunContext};
pub use schema::{AggregateReport, FlameNode, RunReport, RunSummary, TaxonomicEntry};
