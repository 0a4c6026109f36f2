//! # Cadre - Performance Review Server
//!
//! The main binary for the Cadre review backend.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for review-cycle operations
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 apps/cadre (THE BINARY)                │
//! │                                                        │
//! │   ┌─────────────┐              ┌─────────────┐         │
//! │   │   CLI       │              │   HTTP API  │         │
//! │   │  (clap)     │              │   (axum)    │         │
//! │   └──────┬──────┘              └──────┬──────┘         │
//! │          │                            │                │
//! │          └─────────────┬──────────────┘                │
//! │                        ▼                               │
//! │                ┌──────────────┐                        │
//! │                │  cadre-core  │                        │
//! │                │ (THE DOMAIN) │                        │
//! │                └──────────────┘                        │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! cadre server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! cadre status
//! cadre create-cycle --name "H1 2026" --year 2026 --start 2026-01-05 \
//!     --self-review 2026-02-01 --peer-feedback 2026-02-15 \
//!     --manager-evaluation 2026-03-01 --calibration 2026-03-15 \
//!     --feedback-delivery 2026-03-31
//! cadre summary -C <cycle-id> --reviewee <employee-id>
//! ```

use cadre::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — CADRE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CADRE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cadre=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Cadre startup banner.
fn print_banner() {
    println!(
        r#"
   ██████╗ █████╗ ██████╗ ██████╗ ███████╗
  ██╔════╝██╔══██╗██╔══██╗██╔══██╗██╔════╝
  ██║     ███████║██║  ██║██████╔╝█████╗
  ██║     ██╔══██║██║  ██║██╔══██╗██╔══╝
  ╚██████╗██║  ██║██████╔╝██║  ██║███████╗
   ╚═════╝╚═╝  ╚═╝╚═════╝ ╚═╝  ╚═╝╚══════╝

  Performance Review Server v{}

  Cycles • Nominations • Anonymized Feedback
"#,
        env!("CARGO_PKG_VERSION")
    );
}
