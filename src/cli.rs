// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Conversions: turning raw arguments into validated Settings
// =============================================================================

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::checker::{ProbeConfig, ProbePolicy, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::error::ConfigError;
use crate::pipeline::Settings;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "page-inspector",
    version,
    about = "Inspect a web page: doctype, title, headings, and the state of every link on it",
    long_about = "page-inspector fetches a single page, reports its declared HTML version, title and \
                  heading structure, then probes every link on it concurrently to find internal vs \
                  external links, inaccessible links, and links that look like login pages."
)]
pub struct Cli {
    /// URL of the page to inspect (e.g., https://example.com)
    ///
    /// This is a positional argument (required, no flag needed)
    pub url: String,

    /// Output the report in JSON format instead of text
    #[arg(long)]
    pub json: bool,

    /// Maximum number of links probed at the same time (1-500)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout for each probe request, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Give up on all outstanding probes after this many seconds
    ///
    /// Links still being probed when the deadline hits are reported as
    /// inaccessible.
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Count links answering with a non-2xx status as inaccessible
    ///
    /// By default any HTTP response means the link is reachable; only
    /// network failures (DNS, refused connection, timeout...) count.
    #[arg(long)]
    pub strict_status: bool,

    /// Exit with code 1 if any link is inaccessible (useful in CI)
    #[arg(long)]
    pub fail_on_inaccessible: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log level used when RUST_LOG is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline.map(Duration::from_secs)
    }

    /// Converts the raw arguments into validated run settings.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let probe = ProbeConfig {
            timeout: Duration::from_secs(self.timeout),
            policy: if self.strict_status {
                ProbePolicy::Status
            } else {
                ProbePolicy::Transport
            },
            ..ProbeConfig::default()
        };
        Settings::new(probe, self.concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("page-inspector").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["https://example.com"]);
        assert_eq!(cli.url, "https://example.com");
        assert!(!cli.json);
        assert_eq!(cli.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(cli.deadline(), None);
        assert_eq!(cli.log_level(), "info");

        let settings = cli.settings().unwrap();
        assert_eq!(settings.probe().timeout, Duration::from_secs(10));
        assert_eq!(settings.probe().policy, ProbePolicy::Transport);
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "https://example.com",
            "--json",
            "--concurrency",
            "4",
            "--timeout",
            "3",
            "--deadline",
            "30",
            "--strict-status",
            "-vv",
        ]);
        assert!(cli.json);
        assert_eq!(cli.deadline(), Some(Duration::from_secs(30)));
        assert_eq!(cli.log_level(), "trace");

        let settings = cli.settings().unwrap();
        assert_eq!(settings.concurrency(), 4);
        assert_eq!(settings.probe().timeout, Duration::from_secs(3));
        assert_eq!(settings.probe().policy, ProbePolicy::Status);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(Cli::try_parse_from(["page-inspector"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["page-inspector", "https://x.test", "-q", "-v"]).is_err());
        assert_eq!(parse(&["https://x.test", "-q"]).log_level(), "error");
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        assert!(parse(&["https://x.test", "--concurrency", "0"]).settings().is_err());
        assert!(parse(&["https://x.test", "--timeout", "0"]).settings().is_err());
    }
}
