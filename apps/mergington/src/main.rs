//! # Mergington - Activities Server
//!
//! The main binary for the Mergington High School activities service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for catalog, staff, and token inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │              apps/mergington (THE BINARY)          │
//! │                                                    │
//! │   ┌─────────────┐          ┌─────────────┐         │
//! │   │    CLI      │          │  HTTP API   │         │
//! │   │   (clap)    │          │   (axum)    │         │
//! │   └──────┬──────┘          └──────┬──────┘         │
//! │          └────────────┬───────────┘                │
//! │                       ▼                            │
//! │              ┌─────────────────┐                   │
//! │              │ mergington-core │                   │
//! │              │   (THE LOGIC)   │                   │
//! │              └─────────────────┘                   │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! MERGINGTON_SECRET_KEY=... mergington server --host 0.0.0.0 --port 8000
//!
//! # CLI operations
//! mergington activities
//! mergington issue-token -e rivera@mergington.edu -P ...
//! ```

use clap::Parser;
use mergington::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing. MERGINGTON_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("MERGINGTON_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mergington=info,tower_http=debug".into());

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

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  Mergington High School
  Extracurricular Activities v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
