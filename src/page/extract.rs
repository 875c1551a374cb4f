// src/page/extract.rs
// =============================================================================
// This module extracts structural metadata from a page's HTML.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// What we pull out:
// - The declared document type (sniffed from the raw markup, because the
//   parsed DOM no longer carries the doctype's public identifier)
// - The page title
// - How many <h1>..<h6> headings there are
// - Every <a href> on the page, de-duplicated, in document order
//
// Nothing here touches the network and nothing here can fail. A page that
// is missing something simply yields an empty/zero value for it.
// =============================================================================

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::meta::{DocumentVersion, HeadingCounts, PageMetadata};

// Extracts all metadata from a page in one go
//
// Parameters:
//   markup: the raw HTML of the page, exactly as served
//
// Returns: PageMetadata (never fails)
pub fn extract_metadata(markup: &str) -> PageMetadata {
    let document = Html::parse_document(markup);

    let metadata = PageMetadata {
        version: detect_version(markup),
        title: extract_title(&document),
        headings: extract_heading_counts(&document),
        links: extract_links(&document),
    };

    debug!(
        version = ?metadata.version,
        title = %metadata.title,
        links = metadata.links.len(),
        "extracted page metadata"
    );

    metadata
}

// Detects which document type the markup declares
//
// Every signature in DocumentVersion::ALL is searched for (ignoring ASCII
// case, since `<!doctype html>` is as common as `<!DOCTYPE html>`).
// If several match, the one that appears first in the markup wins; two
// signatures at the same position fall back to table order.
//
// Returns None when the page declares nothing we recognize.
pub fn detect_version(markup: &str) -> Option<DocumentVersion> {
    // Uppercasing ASCII keeps byte offsets intact, so positions stay comparable
    let haystack = markup.to_ascii_uppercase();

    DocumentVersion::ALL
        .iter()
        .enumerate()
        .filter_map(|(rank, version)| {
            let needle = version.signature().to_ascii_uppercase();
            haystack.find(&needle).map(|position| (position, rank, *version))
        })
        .min_by_key(|(position, rank, _)| (*position, *rank))
        .map(|(_, _, version)| version)
}

// Returns the text of the first <title> element, trimmed
pub fn extract_title(document: &Html) -> String {
    let Some(selector) = parse_selector("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

// Counts <h1> through <h6> elements
//
// Levels that don't appear stay at zero.
pub fn extract_heading_counts(document: &Html) -> HeadingCounts {
    let mut counts = HeadingCounts::default();

    for level in 1..=6 {
        if let Some(selector) = parse_selector(&format!("h{}", level)) {
            counts.set(level, document.select(&selector).count());
        }
    }

    counts
}

// Collects the href of every <a> element
//
// - An <a> without href contributes "" (it is still a link on the page)
// - Duplicates are dropped, the first occurrence keeps its position
// - No normalization: "/a" and "/a/" are different links
pub fn extract_links(document: &Html) -> Vec<String> {
    let Some(selector) = parse_selector("a") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let href = element.value().attr("href").unwrap_or("");
        if seen.insert(href) {
            links.push(href.to_string());
        }
    }

    links
}

// Parses a CSS selector
//
// All our selectors are constants, so a failure here is a programming error.
// We still don't panic: the affected field degrades to its empty value.
fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = css, error = %e, "invalid CSS selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links_of(html: &str) -> Vec<String> {
        extract_links(&Html::parse_document(html))
    }

    #[test]
    fn test_links_are_deduplicated_in_order() {
        let html = r#"
            <a href="/a">A</a>
            <a href="/b">B</a>
            <a href="/a">A again</a>
            <a href="/c">C</a>
        "#;
        assert_eq!(links_of(html), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_links_keep_raw_hrefs() {
        let html = r##"
            <a href="#section">Jump</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="HTTP://Example.com/X">Upper</a>
        "##;
        assert_eq!(
            links_of(html),
            vec!["#section", "mailto:someone@example.com", "HTTP://Example.com/X"]
        );
    }

    #[test]
    fn test_anchor_without_href_is_empty_link() {
        let html = r#"<a name="top">Top</a><a>Also none</a><a href="/x">X</a>"#;
        assert_eq!(links_of(html), vec!["", "/x"]);
    }

    #[test]
    fn test_link_extraction_is_idempotent() {
        let html = r#"<a href="/z"></a><a href="/y"></a><a href="/z"></a>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_links(&document), extract_links(&document));
    }

    #[test]
    fn test_heading_counts() {
        let document = Html::parse_document("<h1>A</h1><h2>B</h2><h2>C</h2>");
        let counts = extract_heading_counts(&document);
        let all: Vec<_> = counts.iter().collect();
        assert_eq!(all, vec![(1, 1), (2, 2), (3, 0), (4, 0), (5, 0), (6, 0)]);
    }

    #[test]
    fn test_title() {
        let document = Html::parse_document(
            "<html><head><title>  Welcome! </title></head><body></body></html>",
        );
        assert_eq!(extract_title(&document), "Welcome!");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let document = Html::parse_document("<p>no title here</p>");
        assert_eq!(extract_title(&document), "");
    }

    #[test]
    fn test_detect_html5_any_case() {
        assert_eq!(detect_version("<!DOCTYPE html><html></html>"), Some(DocumentVersion::Html5));
        assert_eq!(detect_version("<!doctype html><html></html>"), Some(DocumentVersion::Html5));
    }

    #[test]
    fn test_detect_xhtml_transitional() {
        let markup = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN"
            "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
            <html xmlns="http://www.w3.org/1999/xhtml"></html>"#;
        assert_eq!(detect_version(markup), Some(DocumentVersion::Xhtml10Transitional));
    }

    #[test]
    fn test_detect_html401_strict() {
        let markup = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN"
            "http://www.w3.org/TR/html4/strict.dtd">"#;
        assert_eq!(detect_version(markup), Some(DocumentVersion::Html401Strict));
    }

    #[test]
    fn test_detect_nothing() {
        assert_eq!(detect_version("<html><body>plain</body></html>"), None);
    }

    #[test]
    fn test_earliest_signature_wins() {
        // The real declaration comes first; a later mention in a comment must not win
        let markup = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN">
            <!-- migrated from "-//W3C//DTD HTML 4.01 Frameset//EN" -->
            <p><!DOCTYPE html></p>"#;
        assert_eq!(detect_version(markup), Some(DocumentVersion::Xhtml11));
    }

    #[test]
    fn test_extract_metadata_end_to_end() {
        let markup = r#"<!DOCTYPE html>
            <html><head><title>Site</title></head>
            <body>
              <h1>A</h1><h2>B</h2><h2>C</h2>
              <a href="/login">Sign in</a>
              <a href="http://external.test/">Elsewhere</a>
            </body></html>"#;
        let metadata = extract_metadata(markup);
        assert_eq!(metadata.version, Some(DocumentVersion::Html5));
        assert_eq!(metadata.title, "Site");
        assert_eq!(metadata.headings.get(1), 1);
        assert_eq!(metadata.headings.get(2), 2);
        assert_eq!(metadata.headings.get(3), 0);
        assert_eq!(metadata.links, vec!["/login", "http://external.test/"]);
    }
}
