use crate::output::read_report;
use crate::utils::config::{REPORT_SCHEMA_VERSION, TIME_CATEGORIES, VIRMAP_TAX_FLAGS};
use anyhow::Result;
use std::path::PathBuf;

/// Validate an aggregate report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!("  Runs: {}", report.runs.len());

    if report.version != REPORT_SCHEMA_VERSION {
        println!(
            "  ⚠ Schema version differs from this build ({})",
            REPORT_SCHEMA_VERSION
        );
    }

    for run in &report.runs {
        if run.walltimes.len() != report.categories.len() {
            anyhow::bail!(
                "Run {} has {} wall times for {} categories",
                run.run_name,
                run.walltimes.len(),
                report.categories.len()
            );
        }
        println!(
            "  {}: {} outputs, {} critical errors",
            run.run_name, run.summary.output_seqs, run.summary.critical_errors
        );
    }

    Ok(())
}

/// Display the canonical stage list and the counted flags
pub fn display_categories() {
    println!("Stage categories (report column order):");
    for (index, name) in TIME_CATEGORIES.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, name);
    }
    println!();
    println!("Sequence flags: {}", VIRMAP_TAX_FLAGS.join(", "));
}

/// Display version information
pub fn display_version() {
    println!("virmap-stats v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Timing, error and taxonomy statistics for VirMap runs.");
}
