//! Output JSON schema definitions for aggregated run data.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Top-level report covering every analysed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when report was generated
    pub generated_at: String,

    /// Stage names the flat timing vectors are aligned to
    pub categories: Vec<String>,

    /// Sequence flags counted in each run summary
    pub flags: Vec<String>,

    /// One entry per successfully analysed run, sorted by run name
    pub runs: Vec<RunReport>,
}

/// Everything extracted from one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_name: String,
    pub summary: RunSummary,
    pub walltimes: Vec<Option<f64>>,
    pub cpu_times: Vec<Option<f64>>,
    pub cpu_ratios: Vec<Option<f64>>,
    pub taxonomy: Vec<TaxonomicEntry>,
}

/// Error and output tallies for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub benign_errors: usize,
    pub critical_errors: usize,
    pub killed_count: usize,
    pub output_seqs: usize,
    pub unique_taxids: usize,
    /// Outputs assigned only to the "Viruses" root
    pub generic_virus_outputs: usize,
    /// Counts per recognised sequence flag
    pub flag_counts: BTreeMap<String, usize>,
    /// Whether the benign count matches a healthy run
    pub benign_as_expected: bool,
}

/// One taxonomically assigned output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomicEntry {
    pub tax_id: u32,
    pub size: u64,
    pub flags: BTreeSet<String>,
    /// Ancestor names from the top of the tree down to the id itself
    pub lineage: Vec<String>,
}

/// Timing tree node in the shape the flame chart viewer expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlameNode {
    pub name: String,

    /// Elapsed seconds
    pub value: Option<f64>,

    /// Omitted entirely for leaves
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FlameNode>,
}
