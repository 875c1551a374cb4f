// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: Probes a single URL and decides whether it is reachable
// - classify: Internal/external placement, login heuristic, Classifier trait
// - dispatch: Runs one classification per link concurrently and streams
//   the results back
//
// This file (mod.rs) is the module root - it re-exports the public API that
// other parts of our application use.
// =============================================================================

mod classify;
mod dispatch;
mod http;

pub use classify::{ClassifiedLink, Classifier, HttpClassifier, LinkKind};
pub use dispatch::{Dispatcher, DEFAULT_CONCURRENCY};
pub use http::{ProbeConfig, ProbePolicy, DEFAULT_TIMEOUT};
