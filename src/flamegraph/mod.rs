//! Flamegraph generation using the inferno library.
//!
//! This module renders timing trees as interactive HTML flame charts and
//! static SVG flamegraphs, plus a terminal text summary.

pub mod generator;

// Re-export main types
pub use generator::{
    generate_flamegraph_svg, generate_text_summary, render_flame_html, FlameConfig,
    DEFAULT_TEMPLATE,
};
