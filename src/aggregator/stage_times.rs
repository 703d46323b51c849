//! Flat per-stage timings aligned to the canonical stage list.

use crate::parser::extractor::{extract_stage_records, read_optional_log};
use crate::parser::run_info::RunContext;
use crate::utils::config::TIME_CATEGORIES;
use crate::utils::error::{RunError, StageError};
use log::warn;

/// Lookup of canonical stage names
///
/// Strict lookups reject unknown names; lenient ones warn and skip them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageLookup {
    strict: bool,
}

impl StageLookup {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Column index of `stage`, `None` when skipped in lenient mode
    pub fn index_of(&self, stage: &str) -> Result<Option<usize>, StageError> {
        match TIME_CATEGORIES.iter().position(|name| *name == stage) {
            Some(index) => Ok(Some(index)),
            None if self.strict => Err(StageError::UnknownStage(stage.to_string())),
            None => {
                warn!("Skipping unknown stage {:?}", stage);
                Ok(None)
            }
        }
    }
}

/// Wall time, CPU time and CPU ratio per canonical stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageTimings {
    pub walltimes: Vec<Option<f64>>,
    pub cpu_times: Vec<Option<f64>>,
    pub cpu_ratios: Vec<Option<f64>>,
}

impl Default for StageTimings {
    fn default() -> Self {
        Self {
            walltimes: vec![None; TIME_CATEGORIES.len()],
            cpu_times: vec![None; TIME_CATEGORIES.len()],
            cpu_ratios: vec![None; TIME_CATEGORIES.len()],
        }
    }
}

impl StageTimings {
    /// Fill the table from primary log text; later records for a stage win
    pub fn from_log(text: &str, sample: &str, lookup: StageLookup) -> Result<Self, StageError> {
        let mut timings = Self::default();

        for record in extract_stage_records(text, Some(sample)) {
            let Some(index) = lookup.index_of(&record.label)? else {
                continue;
            };
            timings.walltimes[index] = record.wall_seconds;
            timings.cpu_times[index] = record.cpu_seconds;
            timings.cpu_ratios[index] = record.cpu_ratio;
        }

        Ok(timings)
    }

    /// Wall time recorded for a stage name
    pub fn walltime_of(&self, stage: &str) -> Option<f64> {
        let index = TIME_CATEGORIES.iter().position(|name| *name == stage)?;
        self.walltimes[index]
    }
}

/// Flat timing table of one run
///
/// # Errors
/// * `RunError::MissingFile` - the primary log does not exist
/// * `RunError::Stage` - strict lookup met an unknown stage name
pub fn simple_timing_info(ctx: &RunContext, lookup: StageLookup) -> Result<StageTimings, RunError> {
    let primary = ctx.primary_log();
    let text = read_optional_log(&primary)?.ok_or_else(|| RunError::MissingFile(primary))?;

    Ok(StageTimings::from_log(&text, ctx.short_name(), lookup)?)
}
