//! Aggregation of extracted log data into timing trees and run summaries.
//!
//! This module transforms parsed log records into:
//! - A hierarchical timing tree per run
//! - A flat per-stage timing table
//! - Collapsed stacks (for SVG flamegraph generation)
//! - Error and output tallies

pub mod stack_builder;
pub mod stage_times;
pub mod summary;
pub mod timing_tree;
pub mod tree_builder;

// Re-export main types and functions
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use stage_times::{simple_timing_info, StageLookup, StageTimings};
pub use summary::{
    classify_line, collect_warnings_and_errors, final_output, summarize, ClassifiedLine,
};
pub use timing_tree::{ChildPolicy, TimingNode};
pub use tree_builder::{build_timing_tree, TimingTreeBuilder};
