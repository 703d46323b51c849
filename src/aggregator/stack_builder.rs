//! Build collapsed stack format from a timing tree.
//!
//! Collapsed stacks are the input format for SVG flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "root;diamond to virus;Blasting 1500"
//! This means: 1.5 seconds were spent in "Blasting" itself, not in any
//! of its children.

use crate::aggregator::timing_tree::TimingNode;
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Self time of the innermost frame, in milliseconds
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Line in the `stack weight` form the flamegraph renderer reads
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a timing tree
///
/// **Public** - used by flamegraph generation and the text summary
///
/// # Arguments
/// * `tree` - Root of a run's timing tree
///
/// # Returns
/// Stacks sorted by weight (heaviest first), then by path
///
/// Every node with a measured self time contributes one stack. Nodes
/// without a wall time contribute nothing but still appear as frames in
/// their descendants' stacks, and their subtree counts against the
/// parent's self time. Identical paths are summed.
pub fn build_collapsed_stacks(tree: &TimingNode) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    let mut path: Vec<String> = Vec::new();

    walk(tree, &mut path, &mut stack_map);

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .filter(|(_, weight)| *weight > 0)
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!(
        "Built {} collapsed stacks from {} nodes",
        stacks.len(),
        tree.node_count()
    );

    stacks
}

fn walk(node: &TimingNode, path: &mut Vec<String>, stack_map: &mut HashMap<String, u64>) {
    path.push(frame_name(node));

    if let Some(self_time) = node.self_time() {
        let millis = (self_time * 1000.0).round() as u64;
        *stack_map.entry(path.join(";")).or_insert(0) += millis;
    }

    for child in node.children() {
        walk(child, path, stack_map);
    }

    path.pop();
}

// ';' separates frames and a trailing number is read as the weight
fn frame_name(node: &TimingNode) -> String {
    node.display_name().replace(';', ",").trim().to_string()
}
