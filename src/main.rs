//! Callsight - call center insight ingestion and reporting system.
//!
//! Imports call transcripts and analysis artifacts into a relational
//! store and serves a REST API for querying calls, analysis results,
//! and merchant records.

mod cli;
mod config;
mod ingest;
mod models;
mod repository;
mod schema;
mod server;
mod services;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "callsight=info"
    } else {
        "callsight=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
