// src/report/mod.rs
// =============================================================================
// This module turns classified links into the final report.
//
// Submodules:
// - aggregator: Drains the result stream and computes the totals
// - render: Prints the report as text or JSON
// =============================================================================

mod aggregator;
mod render;

pub use aggregator::{aggregate, AnalysisReport};
pub use render::{render_json, render_text};
