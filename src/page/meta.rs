// src/page/meta.rs
// =============================================================================
// Metadata extracted from the inspected page.
//
// - DocumentVersion: which (X)HTML version the page declares
// - HeadingCounts: how many <h1>..<h6> elements the page has
// - PageMetadata: everything above plus the title and the raw link list
//
// These are plain data. They are created once by page/extract.rs and never
// changed afterwards.
// =============================================================================

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A document type the page can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentVersion {
    Html5,
    Html401Strict,
    Html401Transitional,
    Html401Frameset,
    Xhtml10Strict,
    Xhtml10Transitional,
    Xhtml10Frameset,
    Xhtml11,
}

impl DocumentVersion {
    /// Every known version, in signature table order.
    pub const ALL: [DocumentVersion; 8] = [
        DocumentVersion::Html5,
        DocumentVersion::Html401Strict,
        DocumentVersion::Html401Transitional,
        DocumentVersion::Html401Frameset,
        DocumentVersion::Xhtml10Strict,
        DocumentVersion::Xhtml10Transitional,
        DocumentVersion::Xhtml10Frameset,
        DocumentVersion::Xhtml11,
    ];

    /// Human-readable name, as shown in the report.
    pub fn label(self) -> &'static str {
        match self {
            DocumentVersion::Html5 => "HTML 5",
            DocumentVersion::Html401Strict => "HTML 4.01 Strict",
            DocumentVersion::Html401Transitional => "HTML 4.01 Transitional",
            DocumentVersion::Html401Frameset => "HTML 4.01 Frameset",
            DocumentVersion::Xhtml10Strict => "XHTML 1.0 Strict",
            DocumentVersion::Xhtml10Transitional => "XHTML 1.0 Transitional",
            DocumentVersion::Xhtml10Frameset => "XHTML 1.0 Frameset",
            DocumentVersion::Xhtml11 => "XHTML 1.1",
        }
    }

    /// The literal text whose presence in the markup declares this version.
    pub fn signature(self) -> &'static str {
        match self {
            DocumentVersion::Html5 => "<!DOCTYPE html>",
            DocumentVersion::Html401Strict => r#""-//W3C//DTD HTML 4.01//EN""#,
            DocumentVersion::Html401Transitional => r#""-//W3C//DTD HTML 4.01 Transitional//EN""#,
            DocumentVersion::Html401Frameset => r#""-//W3C//DTD HTML 4.01 Frameset//EN""#,
            DocumentVersion::Xhtml10Strict => r#""-//W3C//DTD XHTML 1.0 Strict//EN""#,
            DocumentVersion::Xhtml10Transitional => r#""-//W3C//DTD XHTML 1.0 Transitional//EN""#,
            DocumentVersion::Xhtml10Frameset => r#""-//W3C//DTD XHTML 1.0 Frameset//EN""#,
            DocumentVersion::Xhtml11 => r#""-//W3C//DTD XHTML 1.1//EN""#,
        }
    }
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DocumentVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Number of heading elements per level, h1 through h6.
///
/// All six levels always exist; a level the page doesn't use is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingCounts([usize; 6]);

impl HeadingCounts {
    /// Count for a level in `1..=6`. Any other level has no headings.
    pub fn get(&self, level: usize) -> usize {
        match level {
            1..=6 => self.0[level - 1],
            _ => 0,
        }
    }

    pub(crate) fn set(&mut self, level: usize, count: usize) {
        if let 1..=6 = level {
            self.0[level - 1] = count;
        }
    }

    /// `(level, count)` pairs from h1 to h6.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().enumerate().map(|(i, count)| (i + 1, *count))
    }
}

// Serialized as {"h1": 1, "h2": 0, ...} rather than an array, so the JSON
// report is self-describing.
impl Serialize for HeadingCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        for (level, count) in self.iter() {
            map.serialize_entry(&format!("h{}", level), &count)?;
        }
        map.end()
    }
}

/// Everything the extractor learns about the page before any link is probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    /// Declared document type, None when no known signature was found
    pub version: Option<DocumentVersion>,
    /// Text of the <title> element, empty if the page has none
    pub title: String,
    pub headings: HeadingCounts,
    /// Raw hrefs, de-duplicated, in first-seen order
    pub links: Vec<String>,
}
