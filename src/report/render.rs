// src/report/render.rs
// =============================================================================
// Turns an AnalysisReport into output for the user.
//
// Two formats:
// - text: a readable summary plus a per-link table (the default)
// - json: the report as pretty-printed JSON, for scripts and CI
//
// Both write into any `std::io::Write`, so main.rs passes stdout and the
// tests pass a Vec<u8>.
// =============================================================================

use std::io::{self, Write};

use super::aggregator::AnalysisReport;
use crate::checker::{ClassifiedLink, LinkKind};

const URL_WIDTH: usize = 60;

// Writes the human-readable report
pub fn render_text(report: &AnalysisReport, out: &mut impl Write) -> io::Result<()> {
    let title = if report.title.is_empty() { "(none)" } else { report.title.as_str() };
    let version = report.version.map(|v| v.label()).unwrap_or("not detected");

    writeln!(out, "📄 Title:        {}", title)?;
    writeln!(out, "🏷️  HTML version: {}", version)?;
    writeln!(out)?;
    writeln!(out, "Headings by level:")?;
    for (level, count) in report.headings.iter() {
        writeln!(out, "   h{}: {}", level, count)?;
    }
    writeln!(out)?;

    if !report.links.is_empty() {
        writeln!(out, "{:<60} {:<10} {:<12} {:<30}", "URL", "KIND", "STATUS", "DETAIL")?;
        writeln!(out, "{}", "=".repeat(115))?;
        for link in &report.links {
            write_row(link, &mut *out)?;
        }
        writeln!(out)?;
    }

    let counts = &report.counts;
    let login = if report.has_login_candidates() {
        format!("yes ({})", counts.login_candidates)
    } else {
        "no".to_string()
    };

    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   🏠 Internal links: {}", counts.internal)?;
    writeln!(out, "   🌐 External links: {}", counts.external)?;
    writeln!(out, "   ❌ Inaccessible links: {}", counts.inaccessible)?;
    writeln!(out, "   🔑 Login links found: {}", login)?;
    Ok(())
}

// Writes the report as JSON
pub fn render_json(report: &AnalysisReport, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).map_err(io::Error::from)?;
    writeln!(out)
}

fn write_row(link: &ClassifiedLink, out: &mut impl Write) -> io::Result<()> {
    let kind = match link.kind {
        LinkKind::Internal => "internal",
        LinkKind::External => "external",
    };
    let status = if link.reachable { "✅ OK" } else { "❌ DOWN" };
    let url = if link.url.is_empty() { "(empty)".to_string() } else { truncate(&link.url) };
    let detail = link.detail.as_deref().unwrap_or("");

    writeln!(out, "{:<60} {:<10} {:<12} {:<30}", url, kind, status, detail)
}

// Shortens long URLs for the table, on a char boundary
fn truncate(url: &str) -> String {
    if url.chars().count() > URL_WIDTH - 3 {
        let short: String = url.chars().take(URL_WIDTH - 6).collect();
        format!("{}...", short)
    } else {
        url.to_string()
    }
}
