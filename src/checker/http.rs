// src/checker/http.rs
// =============================================================================
// This module probes a single link to see whether it is reachable.
//
// Key functionality:
// - Builds ONE shared HTTP client (connection pooling) for every probe
// - Makes exactly one GET request per link - no retries, no fallbacks
// - Detects the various failure modes (timeout, DNS, SSL, redirect loops...)
// - Decides "reachable or not" according to a ProbePolicy
//
// Rust concepts:
// - async/await: For non-blocking network I/O
// - Enums with data: ProbeStatus carries the status code or error text
// - Builder pattern: reqwest::Client::builder()
// =============================================================================

use std::time::Duration;

use reqwest::{redirect, Client};
use url::Url;

use crate::error::PageError;

/// Sent with every request so site owners can tell who is knocking.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of redirects followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Which responses count as "reachable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbePolicy {
    /// Any HTTP response counts; only transport failures are inaccessible.
    #[default]
    Transport,
    /// Only 2xx responses count; 4xx/5xx are inaccessible as well.
    Status,
}

/// Settings for the shared probe client.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound for a single request, connect to last byte of headers
    pub timeout: Duration,
    pub max_redirects: usize,
    pub policy: ProbePolicy,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            policy: ProbePolicy::default(),
        }
    }
}

impl ProbeConfig {
    // Creates the HTTP client shared by the page loader and every probe
    //
    // reqwest::Client keeps an internal connection pool and is cheap to clone
    // (it's an Arc inside), so all tasks share the same sockets.
    pub fn build_client(&self) -> Result<Client, PageError> {
        Client::builder()
            .timeout(self.timeout)
            .redirect(redirect::Policy::limited(self.max_redirects))
            .user_agent(USER_AGENT)
            .build()
            .map_err(PageError::Client)
    }
}

/// What happened when we probed a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The server answered with this HTTP status code
    Responded(u16),
    /// Request timed out
    Timeout,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// SSL/TLS certificate error
    SslError,
    /// Host refused or dropped the connection
    ConnectionFailed,
    /// The link could not be turned into an absolute URL
    InvalidUrl,
    /// mailto:, tel:, javascript: and friends - nothing to fetch
    UnsupportedScheme(String),
    /// Other error
    Error(String),
}

impl ProbeStatus {
    /// Applies the policy to decide whether the link is reachable.
    pub fn is_reachable(&self, policy: ProbePolicy) -> bool {
        match (self, policy) {
            (ProbeStatus::Responded(_), ProbePolicy::Transport) => true,
            (ProbeStatus::Responded(code), ProbePolicy::Status) => (200..300).contains(code),
            _ => false,
        }
    }

    /// Short human-readable description, stored as the link's detail.
    pub fn describe(&self) -> String {
        match self {
            ProbeStatus::Responded(code) => format!("HTTP {}", code),
            ProbeStatus::Timeout => "request timed out".to_string(),
            ProbeStatus::TooManyRedirects => "too many redirects".to_string(),
            ProbeStatus::DnsError => "could not resolve hostname".to_string(),
            ProbeStatus::SslError => "SSL certificate error".to_string(),
            ProbeStatus::ConnectionFailed => "connection failed".to_string(),
            ProbeStatus::InvalidUrl => "not a valid URL".to_string(),
            ProbeStatus::UnsupportedScheme(scheme) => format!("unsupported scheme '{}'", scheme),
            ProbeStatus::Error(message) => message.clone(),
        }
    }
}

// Probes a single link
//
// Parameters:
//   client: the shared reqwest client
//   target: the resolved URL, or None if the link couldn't be resolved
//
// Returns: ProbeStatus (never an error - failures are data here)
pub async fn probe(client: &Client, target: Option<&Url>) -> ProbeStatus {
    let Some(target) = target else {
        return ProbeStatus::InvalidUrl;
    };

    if !is_checkable_link(target) {
        return ProbeStatus::UnsupportedScheme(target.scheme().to_string());
    }

    // We only need the status line, so the body is never read
    match client.get(target.clone()).send().await {
        Ok(response) => ProbeStatus::Responded(response.status().as_u16()),
        Err(e) => categorize_error(&e),
    }
}

// Only HTTP(S) links can be probed
fn is_checkable_link(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

// Categorizes the different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(error: &reqwest::Error) -> ProbeStatus {
    // The source chain carries the interesting part (hyper / rustls / DNS)
    let error_string = error_chain(error).to_lowercase();

    if error.is_timeout() {
        ProbeStatus::Timeout
    } else if error.is_redirect() {
        ProbeStatus::TooManyRedirects
    } else if error_string.contains("certificate") || error_string.contains("ssl") || error_string.contains("tls") {
        ProbeStatus::SslError
    } else if error.is_connect() {
        if error_string.contains("dns") || error_string.contains("resolve") {
            ProbeStatus::DnsError
        } else {
            ProbeStatus::ConnectionFailed
        }
    } else {
        ProbeStatus::Error(error.to_string())
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
