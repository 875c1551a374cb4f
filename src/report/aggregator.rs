// src/report/aggregator.rs
// =============================================================================
// Collects classified links into the final report.
//
// The aggregator is the single consumer of the dispatcher's result stream.
// It owns its accumulator outright - one fresh Aggregator per run, nothing
// shared, nothing global.
//
// Results arrive in the order probes *finish*, not the order links appear
// on the page, so the report's link list makes no ordering promise.
// =============================================================================

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::checker::{ClassifiedLink, LinkKind};
use crate::page::{DocumentVersion, HeadingCounts, PageMetadata};

/// Totals derived from the classified links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCounts {
    pub internal: usize,
    pub external: usize,
    pub inaccessible: usize,
    pub login_candidates: usize,
}

/// The finished analysis of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub title: String,
    pub version: Option<DocumentVersion>,
    pub headings: HeadingCounts,
    pub links: Vec<ClassifiedLink>,
    pub counts: LinkCounts,
}

impl AnalysisReport {
    pub fn has_login_candidates(&self) -> bool {
        self.counts.login_candidates > 0
    }

    pub fn has_inaccessible_links(&self) -> bool {
        self.counts.inaccessible > 0
    }
}

#[derive(Debug, Default)]
struct Aggregator {
    links: Vec<ClassifiedLink>,
    counts: LinkCounts,
}

impl Aggregator {
    fn record(&mut self, link: ClassifiedLink) {
        match link.kind {
            LinkKind::Internal => self.counts.internal += 1,
            LinkKind::External => self.counts.external += 1,
        }
        if !link.reachable {
            self.counts.inaccessible += 1;
        }
        if link.is_login_candidate {
            self.counts.login_candidates += 1;
        }
        self.links.push(link);
    }

    fn finish(self, metadata: PageMetadata) -> AnalysisReport {
        AnalysisReport {
            title: metadata.title,
            version: metadata.version,
            headings: metadata.headings,
            links: self.links,
            counts: self.counts,
        }
    }
}

// Drains the result stream until it closes and builds the report
//
// Parameters:
//   metadata: what the extractor found (title, version, headings, links)
//   results: the dispatcher's receiver
pub async fn aggregate(metadata: PageMetadata, mut results: mpsc::Receiver<ClassifiedLink>) -> AnalysisReport {
    let mut aggregator = Aggregator::default();

    while let Some(link) = results.recv().await {
        debug!(url = %link.url, reachable = link.reachable, "result received");
        aggregator.record(link);
    }

    if aggregator.links.len() != metadata.links.len() {
        warn!(
            extracted = metadata.links.len(),
            classified = aggregator.links.len(),
            "classified link count differs from extracted link count"
        );
    }

    aggregator.finish(metadata)
}
