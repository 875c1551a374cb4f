// src/checker/classify.rs
// =============================================================================
// This module classifies a single link.
//
// For every link we answer three independent questions:
// 1. Placement: is it internal (same origin, "/path" or "#fragment") or
//    external?
// 2. Reachability: does a single GET against it succeed? (see http.rs)
// 3. Login heuristic: does the URL mention LOGIN or SIGNIN?
//
// All three are always evaluated - an external link is probed too, and an
// unreachable link can still be a login candidate.
//
// The work sits behind the `Classifier` trait, so the dispatcher can be
// driven by a fake classifier in tests without any networking.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::http::{probe, ProbePolicy};
use crate::page::BaseOrigin;

/// Where a link points, relative to the inspected page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    External,
}

/// One link after classification.
///
/// Created exactly once per extracted link and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLink {
    /// The href exactly as it appeared in the page
    pub url: String,
    pub kind: LinkKind,
    /// False if the probe failed (or never ran)
    pub reachable: bool,
    pub is_login_candidate: bool,
    /// What the probe saw, e.g. "HTTP 200" or "connection failed"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ClassifiedLink {
    /// A link whose probe never completed (cancelled, or the task blew up).
    ///
    /// Placement and the login heuristic need no network, so they are still
    /// filled in; only `reachable` is forced to false.
    pub fn unprobed(url: &str, origin: &BaseOrigin, detail: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            kind: placement(url, origin),
            reachable: false,
            is_login_candidate: is_login_candidate(url),
            detail: Some(detail.into()),
        }
    }
}

// Decides whether a link is internal or external
//
// Internal means one of:
// - starts with the page origin ("http://example.com/x")
// - root-relative ("/x")
// - fragment ("#section")
//
// Anything else - other hosts, "about.html", "mailto:", "" - is external.
pub fn placement(link: &str, origin: &BaseOrigin) -> LinkKind {
    if link.starts_with(origin.as_str()) || link.starts_with('/') || link.starts_with('#') {
        LinkKind::Internal
    } else {
        LinkKind::External
    }
}

// Login heuristic: LOGIN or SIGNIN anywhere in the URL, ignoring case
//
// Deliberately dumb: "/blog/how-to-login" matches, "/sign-in" does not.
pub fn is_login_candidate(link: &str) -> bool {
    let upper = link.to_ascii_uppercase();
    upper.contains("LOGIN") || upper.contains("SIGNIN")
}

/// Turns one raw link into a [`ClassifiedLink`].
///
/// Implementations must never fail: problems are reported through
/// `reachable = false`, not through errors or panics.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, link: &str, origin: &BaseOrigin) -> ClassifiedLink;
}

/// The real classifier: probes links over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    policy: ProbePolicy,
}

impl HttpClassifier {
    pub fn new(client: Client, policy: ProbePolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, link: &str, origin: &BaseOrigin) -> ClassifiedLink {
        let kind = placement(link, origin);
        let is_login_candidate = is_login_candidate(link);

        let target = origin.resolve(link);
        let status = probe(&self.client, target.as_ref()).await;
        let reachable = status.is_reachable(self.policy);

        debug!(
            link,
            target = target.as_ref().map(|t| t.as_str()),
            ?kind,
            reachable,
            status = %status.describe(),
            "link classified"
        );

        ClassifiedLink {
            url: link.to_string(),
            kind,
            reachable,
            is_login_candidate,
            detail: Some(status.describe()),
        }
    }
}
