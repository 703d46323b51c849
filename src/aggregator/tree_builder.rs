//! Assemble a run's timing tree from its primary log and sub-tool logs.
//!
//! The primary log's `TIME` records become the top-level stages, in file
//! order. A handful of stages wrap sub-tools that log their own timings;
//! for those the matching stderr file is parsed with that tool's
//! convention and hung underneath the stage.
//!
//! Partial runs are expected: sub-logs may be missing and the run may have
//! been killed before its `Overall` record. In the latter case the
//! scheduler's walltime is used for the root when it can be found.

use super::timing_tree::{ChildPolicy, TimingNode};
use crate::parser::extractor::{
    extract_bracketed_seconds, extract_cycles, extract_scheduler_walltime,
    extract_simple_seconds, extract_stage_records, read_optional_log, BracketedRecord,
    StageRecord,
};
use crate::parser::run_info::{LogLocation, RunContext};
use crate::utils::config::INCOMPLETE_ROOT_NAME;
use crate::utils::error::RunError;
use log::{debug, info, warn};
use std::collections::HashMap;

/// How a sub-tool writes its timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubLogConvention {
    /// `label: N seconds`, with `Total time` as the grand total
    SimpleSeconds,
    /// `label... [Ns]`, closed by `Total time = Ns`
    BracketedSeconds,
    /// `Cycle N started` .. `S seconds for cycle N`
    Cycles,
}

/// Where parsed sub-log timings are attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Under a placeholder child of the stage, which the sub-log's grand
    /// total later renames
    SubRoot(&'static str),
    /// Directly as the stage's own children; grand totals are ignored
    Direct,
}

/// A stage whose sub-tool log is folded into the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubLogRule {
    pub stage: &'static str,
    pub location: LogLocation,
    pub suffix: &'static str,
    pub convention: SubLogConvention,
    pub attachment: Attachment,
}

/// Stages with a known sub-log. Supporting another tool is one entry here.
pub const SUB_LOGS: &[SubLogRule] = &[
    SubLogRule {
        stage: "bbmap to virus",
        location: LogLocation::Output,
        suffix: ".bbmap.err",
        convention: SubLogConvention::SimpleSeconds,
        attachment: Attachment::SubRoot("bb_root"),
    },
    SubLogRule {
        stage: "diamond to virus",
        location: LogLocation::Temp,
        suffix: ".buildSuperScaffolds.err",
        convention: SubLogConvention::BracketedSeconds,
        attachment: Attachment::SubRoot("bss_root"),
    },
    SubLogRule {
        stage: "diamond filter map",
        location: LogLocation::Temp,
        suffix: ".filter.err",
        convention: SubLogConvention::BracketedSeconds,
        attachment: Attachment::SubRoot("dfm_root"),
    },
    SubLogRule {
        stage: "iterative improvement",
        location: LogLocation::Temp,
        suffix: ".iterateImprove.err",
        convention: SubLogConvention::Cycles,
        attachment: Attachment::Direct,
    },
    SubLogRule {
        stage: "diamond full",
        location: LogLocation::Output,
        suffix: ".diamondBlastx.err",
        convention: SubLogConvention::BracketedSeconds,
        attachment: Attachment::Direct,
    },
];

/// Look up the sub-log handling for a stage name
pub fn sub_log_for(stage: &str) -> Option<&'static SubLogRule> {
    SUB_LOGS.iter().find(|spec| spec.stage == stage)
}

impl SubLogRule {
    /// Parse `text` with this spec's convention and attach it to `stage`
    pub fn attach(&self, stage: &mut TimingNode, text: &str) {
        match self.attachment {
            Attachment::SubRoot(placeholder) => {
                let sub_root = stage.append(TimingNode::new(placeholder));
                populate(sub_root, self.convention, text, true);
            }
            Attachment::Direct => populate(stage, self.convention, text, false),
        }
    }
}

/// Add the timings found in `text` under `target`
fn populate(target: &mut TimingNode, convention: SubLogConvention, text: &str, merge_total: bool) {
    match convention {
        SubLogConvention::SimpleSeconds => {
            for timed in extract_simple_seconds(text) {
                if timed.label == "Total time" {
                    if merge_total {
                        target.merge_summary(timed.into(), ChildPolicy::Keep);
                    }
                } else {
                    target.append(timed.into());
                }
            }
        }
        SubLogConvention::BracketedSeconds => {
            for record in extract_bracketed_seconds(text) {
                match record {
                    BracketedRecord::Step(timed) => {
                        target.append(timed.into());
                    }
                    BracketedRecord::Total(timed) if merge_total => {
                        target.merge_summary(timed.into(), ChildPolicy::Keep);
                    }
                    BracketedRecord::Total(_) => {}
                }
            }
        }
        SubLogConvention::Cycles => {
            for cycle in extract_cycles(text) {
                let node = target.append(TimingNode::timed(cycle.label(), cycle.seconds));
                for timed in cycle.timings {
                    node.append(timed.into());
                }
            }
        }
    }
}

/// State machine turning `TIME` records into a tree
///
/// Starts from a bare `root`. `Overall` records overwrite the root's own
/// fields; every other record becomes a new top-level child.
#[derive(Debug)]
pub struct TimingTreeBuilder {
    root: TimingNode,
}

impl Default for TimingTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingTreeBuilder {
    pub fn new() -> Self {
        Self {
            root: TimingNode::new("root"),
        }
    }

    /// Feed one record; `sub_log` is the stage's sub-tool log, if it has one
    pub fn push_record(&mut self, record: &StageRecord, sub_log: Option<&str>) {
        let mut node = TimingNode::from(record);

        if record.is_overall() {
            self.root.merge_summary(node, ChildPolicy::Keep);
            return;
        }

        if let Some(spec) = sub_log_for(&record.label) {
            match sub_log {
                Some(text) => spec.attach(&mut node, text),
                None => debug!("No sub-log for stage {:?}", record.label),
            }
        }

        self.root.append(node);
    }

    /// Finish the tree, falling back to the scheduler walltime if the run
    /// never logged its `Overall` record
    pub fn finish(self, scheduler_log: Option<&str>) -> TimingNode {
        let mut root = self.root;

        if root.elapsed().is_none() {
            if let Some(walltime) = scheduler_log.and_then(extract_scheduler_walltime) {
                info!("Run did not complete, using scheduler walltime of {}s", walltime);
                root.set_name(INCOMPLETE_ROOT_NAME);
                root.set_elapsed(Some(walltime as f64));
            }
        }

        root
    }
}

/// Build the timing tree of one run
///
/// **Public** - main entry point for timing tree reconstruction
///
/// # Arguments
/// * `ctx` - Resolved paths of the run
///
/// # Returns
/// The root node. Its name is `Overall Virmap time` for a finished run,
/// `INCOMPLETE_ROOT_NAME` when only the scheduler walltime was found, and
/// `root` with no time when neither exists.
///
/// # Algorithm
/// 1. Extract the `TIME` records of the primary log, in file order
/// 2. Feed each record to a `TimingTreeBuilder`, reading a stage's
///    sub-log the first time that stage is seen
/// 3. Fall back to the scheduler walltime if no `Overall` record appeared
///
/// Missing or unreadable sub-logs and scheduler logs leave the affected
/// node bare; they never fail the build.
///
/// # Errors
/// * `RunError::MissingFile` - the primary log does not exist
/// * `RunError::Extract` - the primary log exists but could not be read
pub fn build_timing_tree(ctx: &RunContext) -> Result<TimingNode, RunError> {
    let primary = ctx.primary_log();
    let text = read_optional_log(&primary)?.ok_or_else(|| RunError::MissingFile(primary))?;
    let records = extract_stage_records(&text, Some(ctx.short_name()));
    debug!("{}: {} TIME records", ctx.run_name(), records.len());

    // each sub-log is read at most once, even if its stage repeats
    let mut sub_logs: HashMap<&'static str, Option<String>> = HashMap::new();
    let mut builder = TimingTreeBuilder::new();

    for record in &records {
        let sub_log = match sub_log_for(&record.label) {
            Some(spec) => {
                if !sub_logs.contains_key(spec.suffix) {
                    let path = ctx.sub_log(spec.location, spec.suffix);
                    let loaded = match read_optional_log(&path) {
                        Ok(Some(text)) => Some(text),
                        Ok(None) => {
                            info!(
                                "{}: missing {} for stage {:?}",
                                ctx.run_name(),
                                path.display(),
                                spec.stage
                            );
                            None
                        }
                        Err(e) => {
                            warn!(
                                "{}: ignoring sub-log for stage {:?}: {}",
                                ctx.run_name(),
                                spec.stage,
                                e
                            );
                            None
                        }
                    };
                    sub_logs.insert(spec.suffix, loaded);
                }
                sub_logs.get(spec.suffix).and_then(|t| t.as_deref())
            }
            None => None,
        };

        builder.push_record(record, sub_log);
    }

    let scheduler_text = ctx.scheduler_log().and_then(|path| {
        read_optional_log(path).unwrap_or_else(|e| {
            warn!("Ignoring unreadable scheduler log: {}", e);
            None
        })
    });

    Ok(builder.finish(scheduler_text.as_deref()))
}
