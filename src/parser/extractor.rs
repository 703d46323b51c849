//! Line-level extraction of timings from VirMap and sub-tool logs.
//!
//! Every sub-tool prints its timings differently, so each convention is
//! its own matching rule rather than a shared grammar:
//!
//! - simple seconds (bbmap): `label: 12.3 seconds`
//! - bracketed seconds (diamond): `label... [1.5s]`, closed by `Total time = 10s`
//! - cycles (iterative improvement): `Cycle N started` .. `S seconds for cycle N`
//! - main log: `TIME <name> <label>: W seconds, C CPU seconds, R CPU ratio`
//!
//! Numbers that fail to parse become `None`; extraction itself never fails.

use crate::utils::config::CYCLE_KEPT_TIMINGS;
use crate::utils::error::ExtractError;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

static PAT_SIMPLE_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^(.*?):\s+([\d.]+) seconds").expect("simple seconds pattern")
});

static PAT_BRACKETED_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^(.*?)\.\.\.\s+\[([\d.]+)s\]\r?$|^(Total time) = ([\d.]+)s\r?$")
        .expect("bracketed seconds pattern")
});

static PAT_CYCLE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Cycle (\d+) started").expect("cycle start pattern"));

static PAT_CYCLE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([\d.]+) seconds for cycle (\d+)\s*$").expect("cycle end pattern")
});

static PAT_TIME_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?):?[\t ]*([\d.]+) seconds").expect("time seconds pattern")
});

static PAT_MAIN_LOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)TIME (\S+) (.*?): ([\d.]+) seconds, ([\d.]+) CPU seconds, ([\d.]+) CPU ratio",
    )
    .expect("main log pattern")
});

static PAT_WALLTIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Walltime Used: (\d+):(\d+):(\d+)").expect("walltime pattern")
});

static PAT_TAX_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btaxId=(\d+);(?:.*?;)?size=(\d+)").expect("tax id pattern")
});

static PAT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)=1\b").expect("tag pattern"));

/// A label with an optional duration in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLabel {
    pub label: String,
    pub seconds: Option<f64>,
}

impl TimedLabel {
    fn new(label: &str, seconds: &str) -> Self {
        Self {
            label: label.to_string(),
            seconds: parse_seconds(seconds),
        }
    }
}

/// One match of the bracketed-seconds convention
#[derive(Debug, Clone, PartialEq)]
pub enum BracketedRecord {
    /// A per-step line, `label... [Ns]`
    Step(TimedLabel),
    /// The terminal `Total time = Ns` line
    Total(TimedLabel),
}

/// One completed iterative improvement cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSpan {
    pub number: u32,
    pub seconds: Option<f64>,
    /// Only the timings listed in `CYCLE_KEPT_TIMINGS`, in log order
    pub timings: Vec<TimedLabel>,
}

impl CycleSpan {
    pub fn label(&self) -> String {
        format!("Cycle {}", self.number)
    }
}

/// A canonical `TIME` record from the primary VirMap log
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub sample: String,
    pub label: String,
    pub wall_seconds: Option<f64>,
    pub cpu_seconds: Option<f64>,
    pub cpu_ratio: Option<f64>,
}

impl StageRecord {
    /// `Overall ...` records describe the whole run rather than a stage
    pub fn is_overall(&self) -> bool {
        self.label.starts_with("Overall")
    }
}

/// A `taxId=..;size=..` record from the final output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub tax_id: u32,
    pub size: u64,
    pub flags: BTreeSet<String>,
}

/// Parse a seconds field, treating malformed text as absent
pub fn parse_seconds(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extract `label: N seconds` lines
pub fn extract_simple_seconds(text: &str) -> Vec<TimedLabel> {
    PAT_SIMPLE_SECONDS
        .captures_iter(text)
        .map(|caps| TimedLabel::new(&caps[1], &caps[2]))
        .collect()
}

/// Extract `label... [Ns]` lines and the closing `Total time = Ns` line
pub fn extract_bracketed_seconds(text: &str) -> Vec<BracketedRecord> {
    PAT_BRACKETED_SECONDS
        .captures_iter(text)
        .filter_map(|caps| {
            if let (Some(label), Some(seconds)) = (caps.get(3), caps.get(4)) {
                Some(BracketedRecord::Total(TimedLabel::new(
                    label.as_str(),
                    seconds.as_str(),
                )))
            } else {
                let label = caps.get(1)?;
                let seconds = caps.get(2)?;
                Some(BracketedRecord::Step(TimedLabel::new(
                    label.as_str(),
                    seconds.as_str(),
                )))
            }
        })
        .collect()
}

/// Extract completed `Cycle N` spans from an iterative improvement log
///
/// A cycle that never reports its closing `S seconds for cycle N` line
/// (killed run, truncated log) produces nothing. A new `Cycle M started`
/// line abandons any still-open cycle.
pub fn extract_cycles(text: &str) -> Vec<CycleSpan> {
    let mut cycles = Vec::new();
    let mut open: Option<(u32, Vec<TimedLabel>)> = None;

    for line in text.lines() {
        if let Some(caps) = PAT_CYCLE_START.captures(line) {
            if let Ok(number) = caps[1].parse::<u32>() {
                if let Some((abandoned, _)) = open.take() {
                    debug!("Cycle {} abandoned before completion", abandoned);
                }
                open = Some((number, Vec::new()));
            }
            continue;
        }

        let Some((number, timings)) = open.as_mut() else {
            continue;
        };

        if let Some(caps) = PAT_CYCLE_END.captures(line) {
            if caps[2].parse::<u32>().ok() == Some(*number) {
                let number = *number;
                let timings = std::mem::take(timings);
                cycles.push(CycleSpan {
                    number,
                    seconds: parse_seconds(&caps[1]),
                    timings,
                });
                open = None;
                continue;
            }
        }

        if let Some(caps) = PAT_TIME_SECONDS.captures(line) {
            let label = &caps[1];
            if CYCLE_KEPT_TIMINGS.contains(&label) {
                timings.push(TimedLabel::new(label, &caps[2]));
            }
        }
    }

    cycles
}

/// Extract `TIME` records from the primary log
///
/// With `sample` set, only records for that sample name are returned
/// (compared case-insensitively, like the rest of the pattern).
pub fn extract_stage_records(text: &str, sample: Option<&str>) -> Vec<StageRecord> {
    PAT_MAIN_LOG
        .captures_iter(text)
        .filter(|caps| sample.map_or(true, |name| caps[1].eq_ignore_ascii_case(name)))
        .map(|caps| StageRecord {
            sample: caps[1].to_string(),
            label: caps[2].to_string(),
            wall_seconds: parse_seconds(&caps[3]),
            cpu_seconds: parse_seconds(&caps[4]),
            cpu_ratio: parse_seconds(&caps[5]),
        })
        .collect()
}

/// Find `Walltime Used: H:M:S` and convert it to seconds
pub fn extract_scheduler_walltime(text: &str) -> Option<u64> {
    let caps = PAT_WALLTIME.captures(text)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;

    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Parse one line of the final output file
pub fn parse_output_record(line: &str) -> Option<OutputRecord> {
    let caps = PAT_TAX_ID.captures(line)?;
    let tax_id = caps[1].parse().ok()?;
    let size = caps[2].parse().ok()?;
    let flags = PAT_TAG
        .captures_iter(line)
        .map(|tag| tag[1].to_string())
        .collect();

    Some(OutputRecord {
        tax_id,
        size,
        flags,
    })
}

/// Read a whole log file, tolerating invalid UTF-8
pub fn read_log(path: &Path) -> Result<String, ExtractError> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| ExtractError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a log file that may legitimately be absent
pub fn read_optional_log(path: &Path) -> Result<Option<String>, ExtractError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ExtractError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}
