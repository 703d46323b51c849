//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod aggregate;
pub mod flame;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use aggregate::{analyse_run, execute_aggregate, validate_args, AnalysedRun};
pub use flame::execute_flame;
pub use models::{AggregateArgs, FlameArgs};
pub use utils::{display_categories, display_version, validate_report_file};
