// src/page/loader.rs
// =============================================================================
// Fetches the page we are going to inspect.
//
// Unlike link probes, a failure here is fatal: without the page there is
// nothing to extract and no report to produce. So we are strict:
// - transport errors (DNS, refused connection, timeout) -> PageError::Request
// - any non-2xx status                                  -> PageError::Status
// - a body that can't be decoded as text                -> PageError::Body
// =============================================================================

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::PageError;

// Fetches a web page and returns its HTML content
//
// Parameters:
//   client: the shared HTTP client (the same one later used for probes)
//   url: the page to fetch
//
// Returns: the raw markup, or a fatal PageError
pub async fn load_page(client: &Client, url: &Url) -> Result<String, PageError> {
    info!(url = %url, "fetching page");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| PageError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PageError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let markup = response.text().await.map_err(|source| PageError::Body {
        url: url.to_string(),
        source,
    })?;

    debug!(url = %url, bytes = markup.len(), "page fetched");
    Ok(markup)
}
