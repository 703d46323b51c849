use crate::flamegraph::FlameConfig;
use std::path::PathBuf;

/// Arguments for the aggregate command
#[derive(Debug, Clone)]
pub struct AggregateArgs {
    /// Directory holding one `<run>.log` plus `<run>/` per sample
    pub samples_dir: Option<PathBuf>,

    /// Explicit run directories, used instead of `samples_dir`
    pub samples: Vec<PathBuf>,

    /// NCBI taxdump directory
    pub taxonomy_dir: PathBuf,

    /// Output path for the JSON report
    pub output: PathBuf,

    /// Where per-run artifacts go (optional)
    pub per_sample_output: Option<PathBuf>,

    /// Reject unknown stage names instead of skipping them
    pub strict_stages: bool,

    /// Print a text summary per run to stdout
    pub print_summary: bool,

    pub flame_config: FlameConfig,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        Self {
            samples_dir: None,
            samples: Vec::new(),
            taxonomy_dir: PathBuf::from("taxdump"),
            output: PathBuf::from("virmap_stats.json"),
            per_sample_output: None,
            strict_stages: false,
            print_summary: false,
            flame_config: FlameConfig::default(),
        }
    }
}

/// Arguments for the flame command
#[derive(Debug, Clone)]
pub struct FlameArgs {
    /// Run directory to chart
    pub run_dir: PathBuf,

    /// Destination directory for the chart files
    pub output_dir: PathBuf,

    /// HTML template replacing the built-in page
    pub template: Option<PathBuf>,

    /// Also render `flame.svg`
    pub svg: bool,

    /// SVG image width in pixels
    pub width: usize,
}

impl Default for FlameArgs {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::new(),
            output_dir: PathBuf::from("."),
            template: None,
            svg: false,
            width: FlameConfig::default().width,
        }
    }
}
