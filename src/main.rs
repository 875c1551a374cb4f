// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr so stdout stays clean)
// 3. Arm the cancellation triggers (optional deadline, Ctrl-C)
// 4. Run the inspection pipeline and print the report
// 5. Exit with proper code (0 = report printed, 1 = inaccessible links and
//    --fail-on-inaccessible was given, 2 = error, no report)
//
// Rust concepts used:
// - async/await: Because we probe many links concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - tokio::select!: Waiting on whichever of several futures finishes first
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker;  // src/checker/ - link classification and probing
mod cli;      // src/cli.rs - command-line parsing
mod error;    // src/error.rs - fatal error types
mod page;     // src/page/ - loading the page and extracting metadata
mod pipeline; // src/pipeline.rs - load -> extract -> probe -> aggregate
mod report;   // src/report/ - aggregation and output

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use report::AnalysisReport;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Parse CLI arguments first, so --help works without any log noise
    let cli = Cli::parse();
    init_logging(&cli);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = report printed
//   Ok(1) = report printed, inaccessible links found, --fail-on-inaccessible
//   Err = fatal error, nothing printed
async fn run(cli: Cli) -> Result<i32> {
    let settings = cli.settings().context("invalid arguments")?;

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(cli.deadline(), cancel.clone());

    let report = pipeline::analyze(&cli.url, &settings, cancel.clone())
        .await
        .with_context(|| format!("could not inspect {}", cli.url))?;

    // Disarm the triggers; all probes are done by now
    cancel.cancel();

    print_report(&report, cli.json)?;

    if cli.fail_on_inaccessible && report.has_inaccessible_links() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// RUST_LOG wins; otherwise -q / -v / -vv pick the level
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// Cancels the run when the deadline passes or the user hits Ctrl-C
//
// Outstanding probes are then reported as inaccessible instead of being
// waited for. The task exits quietly once `cancel` is cancelled elsewhere.
fn spawn_cancel_triggers(deadline: Option<Duration>, cancel: CancellationToken) {
    tokio::spawn(async move {
        let deadline_passed = async {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        let interrupted = async {
            // No signal handler available: never fire
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = deadline_passed => warn!("deadline reached, cancelling outstanding probes"),
            _ = interrupted => warn!("interrupted, cancelling outstanding probes"),
        }

        cancel.cancel();
    });
}

// Prints the report either as text or JSON
fn print_report(report: &AnalysisReport, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        report::render_json(report, &mut out)?;
    } else {
        report::render_text(report, &mut out)?;
    }
    Ok(())
}
