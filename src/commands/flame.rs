//! Flame command implementation.
//!
//! Charts the timing tree of a single run without touching the taxonomy.

use super::models::FlameArgs;
use crate::aggregator::build_timing_tree;
use crate::flamegraph::FlameConfig;
use crate::output::write_flame_files;
use crate::parser::RunContext;
use anyhow::{Context, Result};
use log::info;

/// Execute the flame command
pub fn execute_flame(args: FlameArgs) -> Result<()> {
    let context = RunContext::discover(&args.run_dir)
        .with_context(|| format!("Failed to resolve run {}", args.run_dir.display()))?;

    let template = args
        .template
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))
        })
        .transpose()?;

    let tree = build_timing_tree(&context).context("Failed to build timing tree")?;
    info!("Timing tree for {:?} has {} nodes", context.run_name(), tree.node_count());

    let config = FlameConfig::new()
        .with_title(context.run_name())
        .with_width(args.width)
        .with_template(template);

    write_flame_files(&tree, &args.output_dir, &config, args.svg)
        .context("Failed to write flame chart")?;

    info!("✓ Flame chart written to: {}", args.output_dir.join("flame.html").display());

    Ok(())
}
