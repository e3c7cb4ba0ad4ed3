//! Binary entry point for newsflow.
//!
//! This binary provides the CLI interface for the ingestion pipeline.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use newsflow::config::PipelineConfig;
use newsflow::observability::{self, InitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Newsflow - incremental ingestion of news records dropped into a directory.
#[derive(Parser)]
#[command(name = "newsflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (TOML or JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run one pass; keeps watching when `run_continuously` is set.
    Run {
        /// Reprocess every input file regardless of its fingerprint.
        #[arg(long)]
        force: bool,
    },

    /// Watch the input directory and the snapshot until interrupted.
    Watch,

    /// Create the configured directories and an empty snapshot.
    Init {
        /// Also write an example JSON and CSV file into the input directory.
        #[arg(long)]
        examples: bool,
    },

    /// Export the store to a JSON snapshot.
    Export {
        /// Output file (default: the configured snapshot path).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of records.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show store and state counts.
    Status,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let load = match PipelineConfig::load(cli.config.as_deref()) {
        Ok(load) => load,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::from(e.exit_code());
        },
    };

    let command = cli.command.unwrap_or(Commands::Run { force: false });
    let watching = match command {
        Commands::Watch => true,
        Commands::Run { .. } => load.config.run_continuously,
        Commands::Init { .. } | Commands::Export { .. } | Commands::Status => false,
    };
    let _observability = match observability::init_from_config(
        &load.config,
        InitOptions {
            verbose: cli.verbose,
            metrics_expose: watching,
        },
    ) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::from(e.exit_code());
        },
    };

    for warning in &load.warnings {
        tracing::warn!("{warning}");
    }
    if let Some(source) = &load.source {
        tracing::debug!(path = %source.display(), "configuration loaded");
    }

    let config = load.config;
    let result = match command {
        Commands::Run { force } if !config.run_continuously => {
            commands::cmd_run(&config, force).await
        },
        Commands::Run { .. } | Commands::Watch => commands::cmd_watch(&config).await,
        Commands::Init { examples } => commands::cmd_init(&config, examples),
        Commands::Export { output, limit } => commands::cmd_export(&config, output, limit),
        Commands::Status => commands::cmd_status(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        },
    }
}
