// src/page/origin.rs
// =============================================================================
// The base origin of the inspected page.
//
// An origin is "scheme://host[:port]" - exactly the prefix an absolute
// same-site link starts with. We keep two forms of it:
// - the serialized string, used for the `starts_with` placement check
// - a parsed Url, used to resolve "/path" and "#fragment" links before probing
//
// Rust concepts:
// - Newtypes: wrapping a String/Url pair so callers can't mix it up with
//   any other string
// - Pattern matching on enums from other crates (url::Origin)
// =============================================================================

use url::{Origin, Url};

use crate::error::PageError;

/// Parses the user-supplied target into an absolute URL.
pub fn parse_target(target: &str) -> Result<Url, PageError> {
    Url::parse(target).map_err(|source| PageError::InvalidUrl {
        url: target.to_string(),
        source,
    })
}

/// Scheme, host and (non-default) port of the page being inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseOrigin {
    serialized: String,
    url: Url,
}

impl BaseOrigin {
    /// Derives the origin of a page URL.
    ///
    /// Fails for URLs with an opaque origin (`file:`, `data:`, `mailto:`...),
    /// because nothing on such a page can be "internal" in the web sense.
    pub fn from_page_url(page: &Url) -> Result<Self, PageError> {
        match page.origin() {
            origin @ Origin::Tuple(..) => {
                let serialized = origin.ascii_serialization();
                let url = Url::parse(&serialized).map_err(|source| PageError::InvalidUrl {
                    url: serialized.clone(),
                    source,
                })?;
                Ok(Self { serialized, url })
            }
            Origin::Opaque(_) => Err(PageError::NoOrigin {
                url: page.to_string(),
            }),
        }
    }

    /// The origin as a string, e.g. `http://example.com` (no trailing slash).
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    // Resolves a raw href into the URL that should be probed.
    //
    // Root-relative ("/x") and fragment ("#x") links are joined onto the
    // origin. Everything else must already be an absolute URL; anything that
    // doesn't parse returns None and will be reported as unreachable.
    pub fn resolve(&self, link: &str) -> Option<Url> {
        if link.starts_with('/') || link.starts_with('#') {
            self.url.join(link).ok()
        } else {
            Url::parse(link).ok()
        }
    }
}

impl std::fmt::Display for BaseOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.serialized)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is an origin?
//    - The scheme + host + port part of a URL
//    - "https://example.com:8443/a/b?c" has origin "https://example.com:8443"
//    - Default ports (80 for http, 443 for https) are left out
//
// 2. What does `origin @ Origin::Tuple(..)` mean?
//    - Match the Tuple variant, and bind the whole matched value to `origin`
//    - Handy when you need the value itself, not just its fields
//
// 3. Why Url::join?
//    - It resolves a relative reference the way a browser does
//    - "http://site.test/" joined with "/login" -> "http://site.test/login"
// -----------------------------------------------------------------------------
