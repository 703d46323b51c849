//! Per-run artifact directory.
//!
//! Layout under `<dest>/<run name>/`:
//! - copies of the run and temp directories, final output moved up
//! - `flame.html`, `flame.svg`, `timing_tree.json`
//! - `errors.txt`, `output_taxid_counts.txt`

use super::json::write_tree_json;
use super::text::write_text_file;
use crate::aggregator::stack_builder::build_collapsed_stacks;
use crate::aggregator::timing_tree::TimingNode;
use crate::flamegraph::generator::{generate_flamegraph_svg, render_flame_html, FlameConfig};
use crate::parser::run_info::RunContext;
use crate::parser::schema::TaxonomicEntry;
use crate::utils::error::{FlamegraphError, OutputError};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Write the flame chart files of one timing tree into `dest_dir`
///
/// A tree without any measured time gets no SVG.
pub fn write_flame_files(
    tree: &TimingNode,
    dest_dir: &Path,
    config: &FlameConfig,
    svg: bool,
) -> Result<(), OutputError> {
    write_text_file(&render_flame_html(tree, config)?, dest_dir.join("flame.html"))?;
    write_tree_json(tree, dest_dir.join("timing_tree.json"))?;

    if svg {
        match generate_flamegraph_svg(&build_collapsed_stacks(tree), config) {
            Ok(image) => write_text_file(&image, dest_dir.join("flame.svg"))?,
            Err(FlamegraphError::EmptyTree) => {
                warn!("No measured time in {:?}, skipping flame.svg", tree.name())
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Everything saved for one run
pub fn write_run_artifacts(
    ctx: &RunContext,
    tree: &TimingNode,
    lines: &[String],
    entries: &[TaxonomicEntry],
    dest_root: &Path,
    config: &FlameConfig,
) -> Result<PathBuf, OutputError> {
    let dest_dir = dest_root.join(ctx.run_name());
    info!("Saving extra info for {:?} to {}", ctx.run_name(), dest_dir.display());

    fs::create_dir_all(&dest_dir)?;
    copy_run_dirs(ctx, &dest_dir)?;

    let config = config.clone().with_title(ctx.run_name());
    write_flame_files(tree, &dest_dir, &config, true)?;

    write_text_file(&lines.join("\n"), dest_dir.join("errors.txt"))?;
    write_text_file(&format_taxid_counts(entries), dest_dir.join("output_taxid_counts.txt"))?;

    Ok(dest_dir)
}

/// Copy the run and temp directories into `dest_dir`, then move the final
/// output file up next to them
pub fn copy_run_dirs(ctx: &RunContext, dest_dir: &Path) -> Result<(), OutputError> {
    for source in [ctx.base_dir(), ctx.tmp_dir()] {
        let Some(name) = source.file_name() else {
            continue;
        };
        if !source.is_dir() {
            debug!("Nothing to copy from {}", source.display());
            continue;
        }
        copy_dir(source, &dest_dir.join(name))?;
    }

    let final_name = format!("{}.final.fa", ctx.short_name());
    let copied = dest_dir.join(ctx.run_name()).join(&final_name);
    if copied.is_file() {
        fs::rename(&copied, dest_dir.join(&final_name))?;
    } else {
        warn!("No {} to move for {:?}", final_name, ctx.run_name());
    }

    Ok(())
}

/// Recursive copy, overwriting existing files
fn copy_dir(source: &Path, dest: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// One line per entry, largest first: `taxid=<id>, size=<size> | <lineage>`
pub fn format_taxid_counts(entries: &[TaxonomicEntry]) -> String {
    let mut sorted: Vec<&TaxonomicEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.size.cmp(&a.size));

    sorted
        .iter()
        .map(|e| format!("taxid={}, size={} | {}\n", e.tax_id, e.size, e.lineage.join(" > ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn entry(tax_id: u32, size: u64, lineage: &[&str]) -> TaxonomicEntry {
        TaxonomicEntry {
            tax_id,
            size,
            flags: BTreeSet::new(),
            lineage: lineage.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_taxid_counts_sorted_by_size() {
        let entries = vec![
            entry(10239, 5, &["Viruses"]),
            entry(11308, 50, &["Viruses", "Riboviria", "Orthomyxoviridae"]),
        ];

        assert_eq!(
            format_taxid_counts(&entries),
            "taxid=11308, size=50 | Viruses > Riboviria > Orthomyxoviridae\n\
             taxid=10239, size=5 | Viruses\n"
        );
    }

    #[test]
    fn test_copy_dir_nested() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("sub")).unwrap();
        fs::write(src.path().join("sub/a.err"), "x").unwrap();

        copy_dir(src.path(), &dest.path().join("copy")).unwrap();

        assert_eq!(fs::read_to_string(dest.path().join("copy/sub/a.err")).unwrap(), "x");
    }

    #[test]
    fn test_untimed_tree_skips_svg() {
        let dest = tempfile::tempdir().unwrap();
        let tree = TimingNode::new("root");

        write_flame_files(&tree, dest.path(), &FlameConfig::default(), true).unwrap();

        assert!(dest.path().join("flame.html").is_file());
        assert!(dest.path().join("timing_tree.json").is_file());
        assert!(!dest.path().join("flame.svg").exists());
    }
}
