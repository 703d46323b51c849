//! Aggregate command implementation.
//!
//! The aggregate command:
//! 1. Loads the taxonomy
//! 2. Discovers the run directories
//! 3. Analyses every run (timings, warnings, outputs)
//! 4. Writes the JSON report
//! 5. Saves per-run artifacts

use super::models::AggregateArgs;
use crate::aggregator::{
    build_timing_tree, collect_warnings_and_errors, final_output, simple_timing_info, summarize,
    StageLookup, TimingNode,
};
use crate::flamegraph::generate_text_summary;
use crate::output::{write_report, write_run_artifacts};
use crate::parser::run_info::discover_sample_dirs;
use crate::parser::schema::{AggregateReport, RunReport, TaxonomicEntry};
use crate::parser::RunContext;
use crate::taxonomy::TaxonomyDb;
use crate::utils::config::{REPORT_SCHEMA_VERSION, TIME_CATEGORIES, VIRMAP_TAX_FLAGS};
use crate::utils::error::RunError;
use anyhow::{Context, Result};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything extracted from one run directory
#[derive(Debug, Clone)]
pub struct AnalysedRun {
    pub context: RunContext,
    pub tree: TimingNode,
    pub lines: Vec<String>,
    pub entries: Vec<TaxonomicEntry>,
    pub report: RunReport,
}

/// Analyse a single run directory
///
/// # Errors
/// Any missing required file or unresolvable tax id fails the whole run.
pub fn analyse_run(
    dir: &Path,
    taxonomy: &TaxonomyDb,
    lookup: StageLookup,
) -> Result<AnalysedRun, RunError> {
    let context = RunContext::discover(dir)?;
    info!("Analysing run {:?}", context.run_name());

    let timings = simple_timing_info(&context, lookup)?;
    let tree = build_timing_tree(&context)?;
    let lines = collect_warnings_and_errors(&context)?;
    let entries = final_output(&context, taxonomy)?;
    let summary = summarize(&lines, &entries);

    debug!(
        "{}: {} tree nodes, {} warning lines, {} outputs",
        context.run_name(),
        tree.node_count(),
        lines.len(),
        entries.len()
    );

    let report = RunReport {
        run_name: context.run_name().to_string(),
        summary,
        walltimes: timings.walltimes,
        cpu_times: timings.cpu_times,
        cpu_ratios: timings.cpu_ratios,
        taxonomy: entries.clone(),
    };

    Ok(AnalysedRun {
        context,
        tree,
        lines,
        entries,
        report,
    })
}

/// Execute the aggregate command
///
/// Runs that fail are logged and left out of the report; the command
/// only fails when no run could be analysed at all.
pub fn execute_aggregate(args: AggregateArgs) -> Result<AggregateReport> {
    let start_time = Instant::now();

    info!("Step 1/5: Loading taxonomy...");
    let taxonomy = TaxonomyDb::load(&args.taxonomy_dir)
        .with_context(|| format!("Failed to load taxonomy from {}", args.taxonomy_dir.display()))?;

    info!("Step 2/5: Discovering runs...");
    let run_dirs = run_dirs(&args)?;
    info!("Found {} run directories", run_dirs.len());

    info!("Step 3/5: Analysing runs...");
    let lookup = StageLookup::new(args.strict_stages);
    let mut runs: Vec<AnalysedRun> = Vec::new();
    for dir in &run_dirs {
        match analyse_run(dir, &taxonomy, lookup) {
            Ok(run) => runs.push(run),
            Err(e) => error!("Skipping {}: {}", dir.display(), e),
        }
    }

    if runs.is_empty() {
        anyhow::bail!("None of the {} run directories could be analysed", run_dirs.len());
    }
    runs.sort_by(|a, b| a.report.run_name.cmp(&b.report.run_name));

    info!("Step 4/5: Writing report...");
    let report = AggregateReport {
        version: REPORT_SCHEMA_VERSION.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        categories: TIME_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        flags: VIRMAP_TAX_FLAGS.iter().map(|s| s.to_string()).collect(),
        runs: runs.iter().map(|run| run.report.clone()).collect(),
    };
    write_report(&report, &args.output).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output.display());

    match &args.per_sample_output {
        Some(dest) => {
            info!("Step 5/5: Saving per-run artifacts...");
            for run in &runs {
                let dir = write_run_artifacts(
                    &run.context,
                    &run.tree,
                    &run.lines,
                    &run.entries,
                    dest,
                    &args.flame_config,
                )
                .with_context(|| format!("Failed to save artifacts for {}", run.report.run_name))?;
                info!("✓ {} saved to: {}", run.report.run_name, dir.display());
            }
        }
        None => info!("Step 5/5: Skipping per-run artifacts (not requested)"),
    }

    if args.print_summary {
        for run in &runs {
            println!("\n{}", "=".repeat(80));
            println!("RUN {}", run.report.run_name);
            println!("{}", "=".repeat(80));
            println!("{}", generate_text_summary(&run.tree, &run.report.summary));
        }
    }

    info!(
        "Aggregated {} of {} runs in {:.2}s",
        runs.len(),
        run_dirs.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(report)
}

fn run_dirs(args: &AggregateArgs) -> Result<Vec<PathBuf>> {
    match &args.samples_dir {
        Some(samples_dir) => discover_sample_dirs(samples_dir)
            .with_context(|| format!("Failed to list runs in {}", samples_dir.display())),
        None => Ok(args.samples.clone()),
    }
}

/// Validate aggregate arguments
pub fn validate_args(args: &AggregateArgs) -> Result<()> {
    match (&args.samples_dir, args.samples.is_empty()) {
        (Some(_), false) => anyhow::bail!("Give either a samples directory or explicit samples, not both"),
        (None, true) => anyhow::bail!("No samples given"),
        _ => {}
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.output.is_dir() {
        anyhow::bail!("Output path is a directory: {}", args.output.display());
    }

    let parent = args.output.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        if !parent.is_dir() {
            anyhow::bail!("Destination folder does not exist: {}", parent.display());
        }
    }

    Ok(())
}
