//! Flame chart generation for a run's timing tree.
//!
//! Two renderings are produced:
//! - An interactive HTML page, filled in from a template by plain text
//!   substitution of the title and the serialized tree
//! - A static SVG flamegraph drawn by inferno from collapsed stacks

use crate::aggregator::stack_builder::CollapsedStack;
use crate::aggregator::timing_tree::TimingNode;
use crate::parser::schema::RunSummary;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::{debug, info};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Built-in flame chart page
pub const DEFAULT_TEMPLATE: &str = include_str!("flame_template.html");

static TEMPLATE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)\{\s*TEMPLATE_TITLE\s*\}").expect("title placeholder"));
static TEMPLATE_JS_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\{\s*TEMPLATE_JS_TITLE\s*\}").expect("js title placeholder")
});
static TEMPLATE_DATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)\{\s*TEMPLATE_DATA\s*\}").expect("data placeholder"));

/// Flame chart configuration
#[derive(Debug, Clone)]
pub struct FlameConfig {
    pub title: String,
    /// SVG image width in pixels
    pub width: usize,
    /// HTML template text; the built-in page is used when unset
    pub template: Option<String>,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            title: "VirMap run timings".to_string(),
            width: 1200,
            template: None,
        }
    }
}

impl FlameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }
}

/// Fill a flame chart template with the title and the serialized tree
///
/// **Public** - used by the aggregate and flame commands
///
/// # Arguments
/// * `tree` - Timing tree to embed
/// * `config` - Title and optional custom template
///
/// # Returns
/// The complete HTML page
///
/// Placeholders are `{TEMPLATE_TITLE}` (raw title), `{TEMPLATE_JS_TITLE}`
/// (title as a JSON string literal) and `{TEMPLATE_DATA}` (JSON tree).
/// Matching ignores case and whitespace inside the braces.
pub fn render_flame_html(tree: &TimingNode, config: &FlameConfig) -> Result<String, FlamegraphError> {
    let template = config.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let js_title = serde_json::to_string(&config.title)?;
    let data = serde_json::to_string_pretty(&tree.to_flame())?;

    let page = TEMPLATE_TITLE.replace_all(template, NoExpand(&config.title));
    let page = TEMPLATE_JS_TITLE.replace_all(&page, NoExpand(&js_title));
    let page = TEMPLATE_DATA.replace_all(&page, NoExpand(&data));

    debug!("Rendered flame page for {} nodes", tree.node_count());
    Ok(page.into_owned())
}

/// Generate an SVG flamegraph from collapsed stacks
///
/// # Errors
/// * `FlamegraphError::EmptyTree` - no stack carries any time
/// * `FlamegraphError::RenderFailed` - inferno rejected the input
pub fn generate_flamegraph_svg(
    stacks: &[CollapsedStack],
    config: &FlameConfig,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyTree);
    }

    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = "ms".to_string();
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    let svg = String::from_utf8(svg).map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;
    info!("Flamegraph generated successfully ({} bytes)", svg.len());

    Ok(svg)
}

/// Text summary of the top-level stages and the error counters
pub fn generate_text_summary(tree: &TimingNode, summary: &RunSummary) -> String {
    let mut lines = Vec::new();
    let total = tree.elapsed().filter(|t| *t > 0.0);

    lines.push(format!("  {}", tree.display_name()));
    lines.push("  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━━━┳━━━━━━━━━┓".to_string());
    lines.push(format!(
        "  ┃ {:<32} ┃ {:^12} ┃ {:^9} ┃ {:^7} ┃",
        "Stage", "WALL (s)", "CPU RATIO", "%"
    ));
    lines.push("  ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━━━╋━━━━━━━━━┫".to_string());

    for stage in tree.children() {
        let wall = stage
            .elapsed()
            .map(|t| format!("{:.1}", t))
            .unwrap_or_else(|| "-".to_string());
        let ratio = stage
            .cpu_ratio()
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());
        let share = match (stage.elapsed(), total) {
            (Some(t), Some(total)) => format!("{:.1}%", t / total * 100.0),
            _ => "-".to_string(),
        };

        lines.push(format!(
            "  ┃ {:<32} ┃ {:>12} ┃ {:>9} ┃ {:>7} ┃",
            truncate(stage.name(), 32),
            wall,
            ratio,
            share
        ));
    }

    lines.push("  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━━━┻━━━━━━━━━┛".to_string());
    lines.push(String::new());
    lines.push(format!(
        "  Errors: {} benign{}, {} critical, {} killed",
        summary.benign_errors,
        if summary.benign_as_expected { "" } else { " (unexpected)" },
        summary.critical_errors,
        summary.killed_count
    ));
    lines.push(format!(
        "  Outputs: {} sequences, {} unique tax ids, {} generic virus",
        summary.output_seqs, summary.unique_taxids, summary.generic_virus_outputs
    ));

    lines.join("\n")
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}
