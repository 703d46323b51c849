//! Error classification and output tallies for a run.
//!
//! Warning and error lines are gathered from every log-like file of the
//! run, then split into benign noise and critical problems. Final output
//! records are resolved to lineages and counted.

use crate::parser::extractor::{parse_output_record, read_log, read_optional_log};
use crate::parser::run_info::RunContext;
use crate::parser::schema::{RunSummary, TaxonomicEntry};
use crate::taxonomy::TaxonomyDb;
use crate::utils::config::{
    BENIGN_ERROR_PATTERNS, COLLECTED_LOG_EXTENSIONS, EXPECTED_BENIGN_ERRORS, KILLED_MARKER,
    PERL_DIE_MSGS, PERL_WARNINGS, VIRMAP_TAX_FLAGS, VIRUSES_TAX_ID,
};
use crate::utils::error::{RunError, TaxonomyError};
use log::debug;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static BENIGN_ERRORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BENIGN_ERROR_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("benign error pattern"))
        .collect()
});

/// A collected warning line and how it was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub text: String,
    pub benign: bool,
    pub killed: bool,
}

/// Classify one collected line
///
/// Killed lines are counted on top of their benign/critical class.
pub fn classify_line(line: &str) -> ClassifiedLine {
    let text = line.trim();

    ClassifiedLine {
        text: text.to_string(),
        benign: BENIGN_ERRORS.iter().any(|re| re.is_match(text)),
        killed: text.contains(KILLED_MARKER),
    }
}

/// Whether a line mentions any known die message or warning
pub fn is_warning_line(line: &str) -> bool {
    PERL_DIE_MSGS
        .iter()
        .chain(PERL_WARNINGS)
        .any(|needle| line.contains(needle))
}

/// Matching lines of one file, as `<display>:<line no>:<line>`
pub fn warning_lines_in(text: &str, display: &str) -> Vec<String> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| is_warning_line(line))
        .map(|(index, line)| format!("{}:{}:{}", display, index + 1, line))
        .collect()
}

/// Gather warning and error lines from every log-like file of the run
///
/// Looks at the scheduler log plus every `.err`, `.txt` and `.log` file
/// under the output and temp directories. Paths are reported relative to
/// the run's parent directory.
pub fn collect_warnings_and_errors(ctx: &RunContext) -> Result<Vec<String>, RunError> {
    let mut files: Vec<PathBuf> = ctx.scheduler_log().map(Path::to_path_buf).into_iter().collect();

    for dir in [ctx.base_dir(), ctx.tmp_dir()] {
        if !dir.is_dir() {
            debug!("Skipping missing directory {}", dir.display());
            continue;
        }
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| RunError::IoError(e.into()))?;
            if entry.file_type().is_file() && has_collected_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    let mut lines = Vec::new();
    for file in &files {
        let text = read_log(file)?;
        let display = file.strip_prefix(ctx.parent_dir()).unwrap_or(file);
        lines.extend(warning_lines_in(&text, &display.to_string_lossy()));
    }

    debug!(
        "{}: {} warning lines from {} files",
        ctx.run_name(),
        lines.len(),
        files.len()
    );

    Ok(lines)
}

fn has_collected_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| COLLECTED_LOG_EXTENSIONS.contains(&ext))
}

/// Parse final output text into resolved entries
pub fn parse_final_output(
    text: &str,
    taxonomy: &TaxonomyDb,
) -> Result<Vec<TaxonomicEntry>, TaxonomyError> {
    text.lines()
        .filter_map(|line| parse_output_record(line.trim()))
        .map(|record| {
            Ok(TaxonomicEntry {
                lineage: taxonomy.resolve(record.tax_id)?,
                tax_id: record.tax_id,
                size: record.size,
                flags: record.flags,
            })
        })
        .collect()
}

/// Read and resolve the run's final output file
///
/// # Errors
/// * `RunError::MissingFile` - the final output file does not exist
/// * `RunError::Taxonomy` - a record's tax id is not in the taxonomy
pub fn final_output(
    ctx: &RunContext,
    taxonomy: &TaxonomyDb,
) -> Result<Vec<TaxonomicEntry>, RunError> {
    let path = ctx.final_output();
    let text = read_optional_log(&path)?.ok_or_else(|| RunError::MissingFile(path))?;

    Ok(parse_final_output(&text, taxonomy)?)
}

/// Tally classified lines and output entries
pub fn summarize(lines: &[String], entries: &[TaxonomicEntry]) -> RunSummary {
    let mut summary = RunSummary::default();

    for classified in lines.iter().map(|line| classify_line(line)) {
        if classified.benign {
            summary.benign_errors += 1;
        } else {
            summary.critical_errors += 1;
        }
        if classified.killed {
            summary.killed_count += 1;
        }
    }

    summary.output_seqs = entries.len();
    summary.unique_taxids = entries
        .iter()
        .map(|e| e.tax_id)
        .collect::<HashSet<_>>()
        .len();
    summary.generic_virus_outputs = entries.iter().filter(|e| e.tax_id == VIRUSES_TAX_ID).count();

    summary.flag_counts = VIRMAP_TAX_FLAGS
        .iter()
        .map(|flag| {
            let count = entries.iter().filter(|e| e.flags.contains(*flag)).count();
            (flag.to_string(), count)
        })
        .collect::<BTreeMap<_, _>>();

    summary.benign_as_expected = summary.benign_errors == EXPECTED_BENIGN_ERRORS;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn entry(tax_id: u32, flags: &[&str]) -> TaxonomicEntry {
        TaxonomicEntry {
            tax_id,
            size: 10,
            flags: flags.iter().map(|f| f.to_string()).collect::<BTreeSet<_>>(),
            lineage: vec![],
        }
    }

    #[test]
    fn test_benign_line() {
        let line = "run/S1.log:12:Use of uninitialized value $nextLine in split at /opt/virmap/Virmap.pl line 1857, <GEN3> line 4.";
        let classified = classify_line(line);

        assert!(classified.benign);
        assert!(!classified.killed);
    }

    #[test]
    fn test_other_line_number_is_critical() {
        let line = "Use of uninitialized value $nextLine in split at Virmap.pl line 1858, <GEN3> line 4.";
        assert!(!classify_line(line).benign);
    }

    #[test]
    fn test_killed_counted_independently() {
        let lines = vec![
            "x.err:1:/bin/sh: line 1: 4242 Killed megahit".to_string(),
            "x.err:2:Use of uninitialized value $head in string eq at a.pl line 1900, <X> line 3.".to_string(),
            "x.err:3:Broken pipe".to_string(),
        ];
        let summary = summarize(&lines, &[]);

        assert_eq!(summary.benign_errors, 1);
        assert_eq!(summary.critical_errors, 2);
        assert_eq!(summary.killed_count, 1);
        assert!(!summary.benign_as_expected);
    }

    #[test]
    fn test_benign_line_can_also_be_killed() {
        let lines = vec![
            "x.err:1:Use of uninitialized value $nextLine in split at V.pl line 1857, <GEN1> line 2. Killed"
                .to_string(),
        ];
        let summary = summarize(&lines, &[]);

        assert_eq!(summary.benign_errors, 1);
        assert_eq!(summary.critical_errors, 0);
        assert_eq!(summary.killed_count, 1);
    }

    #[test]
    fn test_output_tallies() {
        let entries = vec![
            entry(10239, &["weak"]),
            entry(10239, &[]),
            entry(11308, &["weak", "merged", "notAFlag"]),
        ];
        let summary = summarize(&[], &entries);

        assert_eq!(summary.output_seqs, 3);
        assert_eq!(summary.unique_taxids, 2);
        assert_eq!(summary.generic_virus_outputs, 2);
        assert_eq!(summary.flag_counts["weak"], 2);
        assert_eq!(summary.flag_counts["merged"], 1);
        assert_eq!(summary.flag_counts["HighOthers"], 0);
        assert!(!summary.flag_counts.contains_key("notAFlag"));
    }

    #[test]
    fn test_warning_lines_formatting() {
        let text = "fine\nsomething cannot happen\nok\nKilled\n";
        let lines = warning_lines_in(text, "run/S1.log");

        assert_eq!(
            lines,
            vec![
                "run/S1.log:2:something cannot happen".to_string(),
                "run/S1.log:4:Killed".to_string(),
            ]
        );
    }
}
