// src/page/mod.rs
// =============================================================================
// This module covers everything about the inspected page itself.
//
// Submodules:
// - loader: Fetches the page over HTTP (failures here are fatal)
// - origin: Works out the page's base origin and resolves relative links
// - extract: Pulls doctype, title, headings and links out of the HTML
// - meta: The data types extract produces
//
// Nothing in here probes links - that's the checker module's job.
// =============================================================================

mod extract;
mod loader;
mod meta;
mod origin;

pub use extract::extract_metadata;
pub use loader::load_page;
pub use meta::{DocumentVersion, HeadingCounts, PageMetadata};
pub use origin::{parse_target, BaseOrigin};
