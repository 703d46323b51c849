//! VirMap Stats CLI
//!
//! Aggregates timings, warnings and taxonomic outputs of VirMap runs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use virmap_stats::commands::{
    display_categories, display_version, execute_aggregate, execute_flame, validate_args,
    validate_report_file, AggregateArgs, FlameArgs,
};
use virmap_stats::flamegraph::FlameConfig;

/// VirMap Stats - run statistics for the VirMap pipeline
#[derive(Parser, Debug)]
#[command(name = "virmap-stats")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate statistics over many runs
    Aggregate {
        /// Directory containing `<run>.log` and `<run>/` for every run
        #[arg(short = 'd', long, conflicts_with = "sample", required_unless_present = "sample")]
        samples_dir: Option<PathBuf>,

        /// Run directory to include (repeatable)
        #[arg(short, long)]
        sample: Vec<PathBuf>,

        /// NCBI taxdump directory (merged.dmp, nodes.dmp, names.dmp)
        #[arg(short, long, env = "VIRMAP_TAXDUMP")]
        taxonomy: PathBuf,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "virmap_stats.json")]
        output: PathBuf,

        /// Save copies, flame charts and listings per run into this directory
        #[arg(long)]
        per_sample_output: Option<PathBuf>,

        /// Fail on stage names outside the canonical list
        #[arg(long)]
        strict_stages: bool,

        /// Print a text summary per run to stdout
        #[arg(long)]
        summary: bool,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,
    },

    /// Write the flame chart of a single run
    Flame {
        /// Run directory
        #[arg(short, long)]
        run: PathBuf,

        /// Destination directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// HTML template replacing the built-in one
        #[arg(long)]
        template: Option<PathBuf>,

        /// Also write an SVG flamegraph
        #[arg(long)]
        svg: bool,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,
    },

    /// Validate an aggregate report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List the canonical stage categories
    Categories,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Aggregate {
            samples_dir,
            sample,
            taxonomy,
            output,
            per_sample_output,
            strict_stages,
            summary,
            width,
        } => {
            let args = AggregateArgs {
                samples_dir,
                samples: sample,
                taxonomy_dir: taxonomy,
                output,
                per_sample_output,
                strict_stages,
                print_summary: summary,
                flame_config: FlameConfig::new().with_width(width),
            };

            validate_args(&args)?;
            execute_aggregate(args)?;
        }

        Commands::Flame {
            run,
            output,
            template,
            svg,
            width,
        } => {
            execute_flame(FlameArgs {
                run_dir: run,
                output_dir: output,
                template,
                svg,
                width,
            })?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Categories => {
            display_categories();
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
