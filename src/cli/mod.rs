//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific
//! modules.

mod annotate;
mod check;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "survclass")]
#[command(about = "Zero-shot classification annotator for survey free-text responses")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./survclass.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every free-text response and write the augmented CSV
    Annotate {
        /// Task version (overrides config; names the input/output files)
        #[arg(long)]
        task_ver: Option<String>,

        /// Input CSV path (overrides the path derived from task version)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV path (overrides the path derived from task version)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Classifier endpoint URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Classifier model (overrides config)
        #[arg(long)]
        model: Option<String>,

        /// Limit number of rows to classify (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Probe classifier availability and print the resolved configuration
    Check {
        /// Classifier endpoint URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Classifier model (overrides config)
        #[arg(long)]
        model: Option<String>,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Annotate {
            task_ver,
            input,
            output,
            endpoint,
            model,
            limit,
        } => {
            annotate::cmd_annotate(
                cli.config.as_deref(),
                task_ver,
                input,
                output,
                endpoint,
                model,
                limit,
            )
            .await
        }
        Commands::Check { endpoint, model } => {
            check::cmd_check(cli.config.as_deref(), endpoint, model).await
        }
    }
}
