// src/pipeline.rs
// =============================================================================
// Ties the whole inspection together:
//
//   target URL
//     -> parse + derive origin          (fatal on failure)
//     -> load the page                  (fatal on failure)
//     -> extract metadata + links       (never fails)
//     -> dispatch one probe per link    (failures stay per-link)
//     -> aggregate into a report
//
// Only the first two steps can abort the run. Once link probing starts,
// every link ends up in the report no matter what happens to its probe.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::checker::{Classifier, Dispatcher, HttpClassifier, ProbeConfig, DEFAULT_CONCURRENCY};
use crate::error::{ConfigError, PageError};
use crate::page::{extract_metadata, load_page, parse_target, BaseOrigin};
use crate::report::{aggregate, AnalysisReport};

/// Lowest accepted number of concurrent probes.
pub const MIN_CONCURRENCY: usize = 1;

/// Highest accepted number of concurrent probes.
pub const MAX_CONCURRENCY: usize = 500;

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    probe: ProbeConfig,
    concurrency: usize,
}

impl Settings {
    pub fn new(probe: ProbeConfig, concurrency: usize) -> Result<Self, ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: concurrency,
                min: MIN_CONCURRENCY,
                max: MAX_CONCURRENCY,
            });
        }
        if probe.timeout == Duration::ZERO {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self { probe, concurrency })
    }

    pub fn probe(&self) -> &ProbeConfig {
        &self.probe
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

// Inspects one page and probes every link on it
//
// Parameters:
//   target: the page URL as typed by the user
//   settings: probe client settings and concurrency cap
//   cancel: cancelling it stops outstanding probes (they are reported as
//           unreachable) or, before the page has loaded, aborts the run
//
// Returns: the full report, or the fatal error that prevented one
pub async fn analyze(
    target: &str,
    settings: &Settings,
    cancel: CancellationToken,
) -> Result<AnalysisReport, PageError> {
    let url = parse_target(target)?;
    let origin = BaseOrigin::from_page_url(&url)?;
    let client = settings.probe().build_client()?;

    let markup = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(PageError::Cancelled { url: url.to_string() }),
        loaded = load_page(&client, &url) => loaded?,
    };

    let metadata = extract_metadata(&markup);
    info!(
        origin = %origin,
        links = metadata.links.len(),
        concurrency = settings.concurrency(),
        "page parsed, probing links"
    );

    // The loader's client is reused so probes share its connection pool
    let classifier: Arc<dyn Classifier> = Arc::new(HttpClassifier::new(client, settings.probe().policy));
    let dispatcher = Dispatcher::new(classifier, settings.concurrency(), cancel);
    let results = dispatcher.dispatch(metadata.links.clone(), &origin);

    let report = aggregate(metadata, results).await;
    info!(
        internal = report.counts.internal,
        external = report.counts.external,
        inaccessible = report.counts.inaccessible,
        login_candidates = report.counts.login_candidates,
        "analysis complete"
    );

    Ok(report)
}
