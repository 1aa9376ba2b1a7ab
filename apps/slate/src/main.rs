//! # Slate - Production Pipeline Gate
//!
//! The main binary for the Slate decision engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/slate (THE BINARY)           │
//! │                                              │
//! │   ┌─────────────┐      ┌────────────────┐    │
//! │   │    CLI      │      │  File loading  │    │
//! │   │   (clap)    │      │ (JSON / TOML)  │    │
//! │   └──────┬──────┘      └───────┬────────┘    │
//! │          └───────────┬─────────┘             │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │  slate-core   │               │
//! │              │  (THE LOGIC)  │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! slate ladder -f vertical
//! slate readiness -p project.json
//! slate unit -m metrics.json -t 60
//! slate check -p project.json -m metrics.json --json-mode
//! ```
//!
//! Exit status: 0 when the command passed, 2 when a gate blocked, 1 on error.

use clap::Parser;
use slate::cli::{self, Outcome};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing. SLATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SLATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_level = if cli.verbose { "slate=debug" } else { "slate=info" };
    let filter = EnvFilter::try_from_env("SLATE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default_level.into());

    // Logs go to stderr; stdout carries the reports.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    match cli::execute(cli) {
        Ok(Outcome::Passed) => {}
        Ok(Outcome::Blocked) => std::process::exit(2),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the Slate startup banner.
fn print_banner() {
    eprintln!("slate v{} | production pipeline gate", env!("CARGO_PKG_VERSION"));
    eprintln!();
}
