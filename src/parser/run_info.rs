//! Discovery of the files belonging to one VirMap run.
//!
//! A run directory `<parent>/<run>` holds `<name>.log` (the primary log),
//! `<name>.final.fa` and some sub-tool stderr files; intermediate files
//! live in `<parent>/<run>_tmp`. The scheduler log, when present, sits in
//! `<parent>` next to the run directory.

use crate::utils::config::SCHEDULER_HEADER_BYTES;
use crate::utils::error::RunError;
use log::{debug, warn};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PAT_SCHEDULER_LOGFILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\.o\d+$").expect("scheduler log filename pattern"));

static PAT_VIRMAP_ARGS_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Virmap called with: .*--outputDir (\S+)").expect("virmap args pattern")
});

/// Resolved paths for one run. Immutable once discovered.
#[derive(Debug, Clone)]
pub struct RunContext {
    base_dir: PathBuf,
    tmp_dir: PathBuf,
    run_name: String,
    short_name: String,
    scheduler_log: Option<PathBuf>,
}

/// Where a sub-log lives relative to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLocation {
    /// `<run>/<name><suffix>`
    Output,
    /// `<run>_tmp/<name><suffix>`
    Temp,
}

impl RunContext {
    /// Resolve every path of the run rooted at `dir`
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, RunError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(RunError::NotFound(dir.to_path_buf()));
        }

        let base_dir = std::path::absolute(dir)?;
        let run_name = base_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| RunError::NoSampleName(base_dir.clone()))?;
        let tmp_dir = base_dir.with_file_name(format!("{}_tmp", run_name));

        let short_name =
            find_short_name(&base_dir)?.ok_or_else(|| RunError::NoSampleName(base_dir.clone()))?;

        let scheduler_log = base_dir
            .parent()
            .and_then(|parent| find_scheduler_log(parent, &run_name));
        if scheduler_log.is_none() {
            warn!(
                "Failed to find pbs log or virmap_wrapper.sh log for {}",
                base_dir.display()
            );
        }

        let ctx = Self {
            base_dir,
            tmp_dir,
            run_name,
            short_name,
            scheduler_log,
        };

        debug!("Run {}: short name {}", ctx.run_name, ctx.short_name);
        debug!("  primary log: {}", ctx.primary_log().display());
        debug!("  temp dir: {}", ctx.tmp_dir.display());
        debug!("  scheduler log: {:?}", ctx.scheduler_log);

        Ok(ctx)
    }

    /// Directory name of the run, used as its display name
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Pipeline-internal sample name (stem of the primary log)
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    pub fn scheduler_log(&self) -> Option<&Path> {
        self.scheduler_log.as_deref()
    }

    pub fn primary_log(&self) -> PathBuf {
        self.sub_log(LogLocation::Output, ".log")
    }

    pub fn final_output(&self) -> PathBuf {
        self.sub_log(LogLocation::Output, ".final.fa")
    }

    /// Path of `<name><suffix>` in the output or temp directory
    pub fn sub_log(&self, location: LogLocation, suffix: &str) -> PathBuf {
        let dir = match location {
            LogLocation::Output => &self.base_dir,
            LogLocation::Temp => &self.tmp_dir,
        };
        dir.join(format!("{}{}", self.short_name, suffix))
    }

    /// Parent directory that collected paths are reported relative to
    pub fn parent_dir(&self) -> &Path {
        self.base_dir.parent().unwrap_or(&self.base_dir)
    }
}

/// Stem of the first `*.log` file (by name) directly inside `dir`
///
/// A plain stem like `S1` wins over a stage log like `S1.bbmap`.
fn find_short_name(dir: &Path) -> Result<Option<String>, RunError> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter_map(|name| name.strip_suffix(".log").map(str::to_string))
        .collect();
    names.sort();

    let plain = names.iter().position(|name| !name.contains('.'));
    Ok(match plain {
        Some(i) => Some(names.swap_remove(i)),
        None => names.into_iter().next(),
    })
}

/// Locate the scheduler log for `run_name` inside `parent_dir`
///
/// Prefers `<parent>/<run>.log` written by `virmap_wrapper.sh`, then any
/// `*.o<jobid>` file whose header names this run as its output directory.
pub fn find_scheduler_log(parent_dir: &Path, run_name: &str) -> Option<PathBuf> {
    let wrapper_log = parent_dir.join(format!("{}.log", run_name));
    if wrapper_log.is_file() {
        return Some(wrapper_log);
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(parent_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.to_str()
                .is_some_and(|p| PAT_SCHEDULER_LOGFILE.is_match(p))
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .find(|path| scheduler_log_matches(path, run_name))
}

/// Check the header of a candidate scheduler log for this run's output dir
fn scheduler_log_matches(path: &Path, run_name: &str) -> bool {
    let mut header = Vec::new();
    let read = File::open(path)
        .and_then(|f| f.take(SCHEDULER_HEADER_BYTES).read_to_end(&mut header));
    if let Err(e) = read {
        debug!("Skipping unreadable candidate {}: {}", path.display(), e);
        return false;
    }

    let header = String::from_utf8_lossy(&header);
    let Some(caps) = PAT_VIRMAP_ARGS_OUTPUT.captures(&header) else {
        return false;
    };

    Path::new(&caps[1])
        .file_name()
        .is_some_and(|name| name.to_string_lossy() == run_name)
}

/// Find run directories inside a directory holding many runs
///
/// Every `<name>.log` whose stem is also an entry of the directory marks
/// `<dir>/<name>` as a run.
pub fn discover_sample_dirs(samples_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, RunError> {
    let samples_dir = samples_dir.as_ref();
    let names: Vec<String> = std::fs::read_dir(samples_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();

    let mut dirs: Vec<PathBuf> = names
        .iter()
        .filter_map(|name| name.strip_suffix(".log"))
        .filter(|stem| names.iter().any(|n| n == stem))
        .map(|stem| samples_dir.join(stem))
        .collect();
    dirs.sort();

    debug!("Found {} runs in {}", dirs.len(), samples_dir.display());

    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_run(parent: &Path, run: &str, short: &str) -> PathBuf {
        let dir = parent.join(run);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.log", short)), "").unwrap();
        dir
    }

    #[test]
    fn test_discover_paths() {
        let temp = tempfile::tempdir().unwrap();
        let dir = make_run(temp.path(), "run_a", "S1");

        let ctx = RunContext::discover(&dir).unwrap();

        assert_eq!(ctx.run_name(), "run_a");
        assert_eq!(ctx.short_name(), "S1");
        assert!(ctx.primary_log().ends_with("run_a/S1.log"));
        assert!(ctx.final_output().ends_with("run_a/S1.final.fa"));
        assert!(ctx
            .sub_log(LogLocation::Temp, ".filter.err")
            .ends_with("run_a_tmp/S1.filter.err"));
        assert!(ctx.scheduler_log().is_none());
    }

    #[test]
    fn test_discover_without_log_fails() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("empty_run");
        fs::create_dir_all(&dir).unwrap();

        assert!(matches!(
            RunContext::discover(&dir),
            Err(RunError::NoSampleName(_))
        ));
    }

    #[test]
    fn test_discover_missing_dir_fails() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            RunContext::discover(temp.path().join("nope")),
            Err(RunError::NotFound(_))
        ));
    }

    #[test]
    fn test_wrapper_log_preferred() {
        let temp = tempfile::tempdir().unwrap();
        make_run(temp.path(), "run_a", "S1");
        fs::write(temp.path().join("run_a.log"), "wrapper").unwrap();
        fs::write(
            temp.path().join("job.o123"),
            "Virmap called with: x --outputDir /data/run_a --y\n",
        )
        .unwrap();

        let found = find_scheduler_log(temp.path(), "run_a").unwrap();
        assert!(found.ends_with("run_a.log"));
    }

    #[test]
    fn test_queue_log_matched_by_header() {
        let temp = tempfile::tempdir().unwrap();
        make_run(temp.path(), "run_a", "S1");
        fs::write(
            temp.path().join("job.o100"),
            "Virmap called with: x --outputDir /data/run_b\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("job.o101"),
            "Virmap called with: x --outputDir /data/run_a\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("job.e101"),
            "Virmap called with: x --outputDir /data/run_a\n",
        )
        .unwrap();

        let found = find_scheduler_log(temp.path(), "run_a").unwrap();
        assert!(found.ends_with("job.o101"));
    }

    #[test]
    fn test_short_name_prefers_plain_stem() {
        let temp = tempfile::tempdir().unwrap();
        let dir = make_run(temp.path(), "run_a", "S1");
        fs::write(dir.join("S1.bbmap.log"), "").unwrap();
        fs::write(dir.join("A.extra.log"), "").unwrap();

        let ctx = RunContext::discover(&dir).unwrap();

        assert_eq!(ctx.short_name(), "S1");
        assert!(ctx.primary_log().ends_with("run_a/S1.log"));
    }

    #[test]
    fn test_short_name_falls_back_to_dotted_stem() {
        let temp = tempfile::tempdir().unwrap();
        let dir = make_run(temp.path(), "run_a", "S1.v2");

        assert_eq!(find_short_name(&dir).unwrap().as_deref(), Some("S1.v2"));
    }

    #[test]
    fn test_queue_log_header_limit() {
        let temp = tempfile::tempdir().unwrap();
        make_run(temp.path(), "run_a", "S1");
        let marker = "Virmap called with: x --outputDir /a/run_a\n";
        let padding = "#".repeat(SCHEDULER_HEADER_BYTES as usize);
        fs::write(temp.path().join("late.o42"), format!("{}\n{}", padding, marker)).unwrap();

        assert!(find_scheduler_log(temp.path(), "run_a").is_none());

        let padding = "#".repeat(SCHEDULER_HEADER_BYTES as usize - marker.len() - 1);
        fs::write(temp.path().join("early.o43"), format!("{}\n{}", padding, marker)).unwrap();

        let found = find_scheduler_log(temp.path(), "run_a").unwrap();
        assert!(found.ends_with("early.o43"));
    }

    #[test]
    fn test_discover_sample_dirs() {
        let temp = tempfile::tempdir().unwrap();
        make_run(temp.path(), "run_b", "S2");
        make_run(temp.path(), "run_a", "S1");
        make_run(temp.path(), "run_c", "S3");
        fs::write(temp.path().join("run_a.log"), "").unwrap();
        fs::write(temp.path().join("run_b.log"), "").unwrap();
        fs::write(temp.path().join("orphan.log"), "").unwrap();

        let dirs = discover_sample_dirs(temp.path()).unwrap();

        assert_eq!(
            dirs,
            vec![temp.path().join("run_a"), temp.path().join("run_b")]
        );
    }
}
