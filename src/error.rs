// src/error.rs
// =============================================================================
// Fatal errors for a page inspection run.
//
// Anything in here aborts the whole run before any link is probed:
// - the target URL is malformed or has no usable origin
// - the page could not be fetched, or answered with a non-success status
// - the HTTP client could not be built
// - the run was cancelled before the page arrived
//
// ConfigError covers bad settings, caught before the run starts.
//
// Per-link probe failures are NOT errors. They end up as `reachable = false`
// entries in the report (see checker/http.rs).
// =============================================================================

use thiserror::Error;

/// Errors that stop a page inspection run.
#[derive(Debug, Error)]
pub enum PageError {
    /// The target string is not a valid absolute URL.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The URL parsed, but has no scheme/host origin (e.g. `file:` or `data:`).
    #[error("URL has no web origin: {url}")]
    NoOrigin { url: String },

    /// Transport-level failure while fetching the page.
    #[error("failed to fetch {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page answered, but not with a 2xx status.
    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read as text.
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The run was cancelled (deadline or Ctrl-C) before the page arrived.
    #[error("cancelled before {url} was loaded")]
    Cancelled { url: String },
}

/// Invalid settings, rejected before anything touches the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid concurrency {value}: must be between {min} and {max}")]
    InvalidConcurrency { value: usize, min: usize, max: usize },

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,
}
