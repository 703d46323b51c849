//! VirMap Stats
//!
//! Timing, error and taxonomy statistics for runs of the VirMap
//! viral metagenomics pipeline.
//!
//! This crate provides the core implementation for the
//! `virmap-stats` CLI tool: it rebuilds a hierarchical timing tree from
//! the pipeline's logs, classifies warnings, resolves output tax ids to
//! lineages and writes an aggregate report plus per-run flame charts.
//!
//! ## Getting Started
//!
//! ```bash
//! virmap-stats aggregate --samples-dir runs/ --taxonomy taxdump/ -o stats.json
//! virmap-stats flame --run runs/sample_1 --output charts/ --svg
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod taxonomy;
pub mod utils;
