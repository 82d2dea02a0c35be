//! survclass - zero-shot classification annotator for survey free-text
//! responses.
//!
//! Reads a task version's free-text descriptions CSV, scores every
//! response against a fixed label set with an external zero-shot
//! classifier, and writes the table back out with one score column per
//! (block, valence, label).

mod classifier;
mod cli;
mod config;
mod services;
mod table;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "survclass=debug"
    } else {
        "survclass=info"
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
