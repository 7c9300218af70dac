//! Gleaner main entry point
//!
//! Command-line interface for the gleaner crawler: run a crawl from a
//! JSON configuration, validate a configuration without crawling, or list
//! the supported rendering engines.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gleaner::config::{check, load_config, CrawlConfig, EngineKind, ValidationReport};
use gleaner::output::{write_result, write_result_to_file};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Gleaner: a configurable structured-data web crawler
///
/// Gleaner extracts structured records from web pages according to a
/// declarative JSON configuration, walking list pages into detail pages
/// across paginated result sets.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version = "1.0.0")]
#[command(about = "A configurable structured-data web crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a crawl and emit its result as JSON
    Crawl {
        /// Path to the JSON configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Write the result to a file instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a configuration without executing it
    Validate {
        /// Path to the JSON configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// List the supported rendering engines
    Engines,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl {
            config,
            output,
            pretty,
        } => handle_crawl(&config, output.as_deref(), pretty).await,
        Command::Validate { config } => handle_validate(&config),
        Command::Engines => handle_engines(),
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the crawl subcommand
async fn handle_crawl(
    config_path: &Path,
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", config_path.display());
    let config = load_config(config_path)
        .with_context(|| format!("failed to load configuration {}", config_path.display()))?;

    let result = gleaner::execute(&config).await;

    match output {
        Some(path) => write_result_to_file(&result, path, pretty)?,
        None => write_result(&result, &mut std::io::stdout().lock(), pretty)?,
    }

    Ok(())
}

/// Handles the validate subcommand
///
/// The validation report is always printed; an invalid configuration
/// additionally exits with a non-zero status.
fn handle_validate(config_path: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;

    let report = match serde_json::from_str::<CrawlConfig>(&contents) {
        Ok(config) => check(&config),
        Err(e) => ValidationReport {
            valid: false,
            errors: vec![format!("Failed to parse JSON: {}", e)],
            warnings: vec![],
        },
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Handles the engines subcommand
fn handle_engines() -> anyhow::Result<()> {
    let engines: Vec<&str> = EngineKind::ALL.iter().map(|e| e.as_str()).collect();
    let listing = serde_json::json!({
        "engines": engines,
        "default": EngineKind::default().as_str(),
    });

    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}
