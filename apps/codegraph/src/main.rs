//! # Codegraph
//!
//! The main binary: converts git repositories, and optionally the syntax
//! trees of their files, into N-Quads.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/codegraph (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │  GitSource  │    │  ParserClient    │   │
//! │  │  (clap)     │    │   (git2)    │    │  (reqwest)       │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                   ┌─────────────────┐                          │
//! │                   │ codegraph-core  │                          │
//! │                   │  (THE ENGINE)   │                          │
//! │                   └─────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Stream a repository as gzipped N-Quads, with syntax trees
//! codegraph quads ./repo -o repo.nq.gz --parser localhost:9432
//!
//! # Import into the database and rank commits
//! codegraph import ./repo
//! codegraph stats -n 5 --sort add --nomerge
//! ```

use clap::Parser;
use codegraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Logs go to stderr: stdout may carry N-Quads.
    // CODEGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CODEGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "codegraph=debug,codegraph_core=debug"
    } else {
        "codegraph=info,codegraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
