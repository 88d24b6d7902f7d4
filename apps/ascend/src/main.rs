//! # Ascend - Fitness Stage Progression
//!
//! The main binary for the Ascend progression engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for journeys, workouts and the stage catalog
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              apps/ascend (THE BINARY)            │
//! │                                                  │
//! │   ┌─────────────┐          ┌─────────────┐       │
//! │   │    CLI      │          │  HTTP API   │       │
//! │   │   (clap)    │          │   (axum)    │       │
//! │   └──────┬──────┘          └──────┬──────┘       │
//! │          └────────────┬───────────┘              │
//! │                       ▼                          │
//! │               ┌───────────────┐                  │
//! │               │  ascend-core  │                  │
//! │               │  (THE LOGIC)  │                  │
//! │               └───────────────┘                  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! ascend server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! ascend stages
//! ascend start -u alice --pushups 12 --situps 25 --squats 25 --run-minutes 44
//! ascend log -u alice --pushups 22 --run-minutes 39 --run-seconds 30
//! ascend status -u alice
//! ```

use ascend::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ASCEND_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ASCEND_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ascend=info,ascend_core=info,tower_http=debug".into());

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
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Ascend startup banner.
fn print_banner() {
    println!(
        r#"
     _                          _
    / \   ___  ___ ___ _ __   __| |
   / _ \ / __|/ __/ _ \ '_ \ / _` |
  / ___ \\__ \ (_|  __/ | | | (_| |
 /_/   \_\___/\___\___|_| |_|\__,_|

  Fitness Stage Progression v{}

  Measure • Progress • Ascend
"#,
        env!("CARGO_PKG_VERSION")
    );
}
