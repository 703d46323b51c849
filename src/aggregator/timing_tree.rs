//! Hierarchical timing model.
//!
//! A `TimingNode` carries mutable summary fields (name, wall time, CPU
//! time, CPU ratio) and an append-only list of children. Children keep
//! the order they appeared in the source log and are never reordered.
//!
//! Summary fields can be overwritten after children have been attached,
//! which is how a placeholder node collects per-step children and later
//! takes on the identity of the sub-log's grand total.

use crate::parser::extractor::{StageRecord, TimedLabel};
use crate::parser::schema::FlameNode;

/// What `merge_summary` does with the children of the incoming node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildPolicy {
    /// Children already attached survive; the other node's are dropped
    #[default]
    Keep,
    /// Children are replaced wholesale by the other node's
    Replace,
}

/// One node of a run's timing tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimingNode {
    name: String,
    elapsed: Option<f64>,
    cpu_seconds: Option<f64>,
    cpu_ratio: Option<f64>,
    children: Vec<TimingNode>,
}

impl TimingNode {
    /// Create a node with no timing information
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a node with wall time only
    pub fn timed(name: impl Into<String>, elapsed: Option<f64>) -> Self {
        Self::new(name).with_elapsed(elapsed)
    }

    pub fn with_elapsed(mut self, elapsed: Option<f64>) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_cpu(mut self, cpu_seconds: Option<f64>, cpu_ratio: Option<f64>) -> Self {
        self.cpu_seconds = cpu_seconds;
        self.cpu_ratio = cpu_ratio;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    pub fn cpu_seconds(&self) -> Option<f64> {
        self.cpu_seconds
    }

    pub fn cpu_ratio(&self) -> Option<f64> {
        self.cpu_ratio
    }

    pub fn children(&self) -> &[TimingNode] {
        &self.children
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_elapsed(&mut self, elapsed: Option<f64>) {
        self.elapsed = elapsed;
    }

    /// Attach `child` as the last child and hand back a handle to it
    ///
    /// The returned reference points at the node now owned by the tree,
    /// so callers can keep populating it after attaching.
    pub fn append(&mut self, child: TimingNode) -> &mut TimingNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Overwrite this node's summary fields with `other`'s
    pub fn merge_summary(&mut self, other: TimingNode, children: ChildPolicy) {
        self.name = other.name;
        self.elapsed = other.elapsed;
        self.cpu_seconds = other.cpu_seconds;
        self.cpu_ratio = other.cpu_ratio;
        if children == ChildPolicy::Replace {
            self.children = other.children;
        }
    }

    /// First direct child called `name`
    pub fn child(&self, name: &str) -> Option<&TimingNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Label shown to viewers, with the CPU ratio folded in
    pub fn display_name(&self) -> String {
        match self.cpu_ratio {
            Some(ratio) => format!("{}, {} CPU ratio", self.name, ratio),
            None => self.name.clone(),
        }
    }

    /// Time not accounted for by children
    ///
    /// An untimed child counts for the time of its own subtree.
    pub fn self_time(&self) -> Option<f64> {
        let own = self.elapsed?;
        let in_children: f64 = self.children.iter().map(TimingNode::subtree_time).sum();
        Some((own - in_children).max(0.0))
    }

    fn subtree_time(&self) -> f64 {
        self.elapsed
            .unwrap_or_else(|| self.children.iter().map(TimingNode::subtree_time).sum())
    }

    /// Total number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TimingNode::node_count).sum::<usize>()
    }

    /// Serialize to the nested name/value/children shape
    pub fn to_flame(&self) -> FlameNode {
        FlameNode {
            name: self.display_name(),
            value: self.elapsed,
            children: self.children.iter().map(TimingNode::to_flame).collect(),
        }
    }
}

impl From<&StageRecord> for TimingNode {
    fn from(record: &StageRecord) -> Self {
        TimingNode::timed(record.label.clone(), record.wall_seconds)
            .with_cpu(record.cpu_seconds, record.cpu_ratio)
    }
}

impl From<TimedLabel> for TimingNode {
    fn from(timed: TimedLabel) -> Self {
        TimingNode::timed(timed.label, timed.seconds)
    }
}
