//! Catalog Crawler CLI
//!
//! Local execution entry point. Needs a running chromedriver for every
//! command that touches the catalog.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use catalog_crawler::{
    error::Result,
    models::{Config, Layout, WalkReport},
    pipeline,
    services::{ConsoleGate, HttpTransfer, LogOnlyGate, OperatorGate, detect_layout},
    session::{Automation, WebDriverSession, settle},
};

/// Catalog Crawler - Universitaly program archiver
#[derive(Parser, Debug)]
#[command(
    name = "catalog-crawler",
    version,
    about = "Walks the course catalog and archives program documents"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "crawler.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create one directory per institution
    Init,

    /// Walk the catalog and materialize missing program nodes
    Crawl {
        /// Report count discrepancies without waiting for Enter
        #[arg(long)]
        no_pause: bool,
    },

    /// Run full pipeline: Init → Crawl
    Run {
        /// Report count discrepancies without waiting for Enter
        #[arg(long)]
        no_pause: bool,
    },

    /// Show materialized and incomplete nodes on disk
    Status,

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Connect to the browser, let the first page settle and detect its layout.
async fn open_session(config: &Config) -> Result<(WebDriverSession, Layout)> {
    let session = WebDriverSession::connect(&config.catalog).await?;
    settle(&session, &config.timing.initial).await?;
    let layout = detect_layout(&session, config).await?;
    Ok((session, layout))
}

fn gate(no_pause: bool) -> Box<dyn OperatorGate> {
    if no_pause {
        Box::new(LogOnlyGate)
    } else {
        Box::new(ConsoleGate)
    }
}

async fn finish(session: WebDriverSession, result: Result<WalkReport>) -> Result<()> {
    if let Err(e) = session.quit().await {
        log::warn!("Failed to close browser session: {}", e);
    }
    let report = result?;
    if !report.discrepancies.is_empty() {
        log::warn!("Institutions with count drift:");
        for discrepancy in &report.discrepancies {
            log::warn!("    {}", discrepancy);
        }
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Catalog Crawler starting...");

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Init => {
            config.validate()?;
            let (session, layout) = open_session(&config).await?;
            let result = pipeline::run_init(&config, &session, layout).await;
            if let Err(e) = session.quit().await {
                log::warn!("Failed to close browser session: {}", e);
            }
            let institutions = result?;
            log::info!("Prepared {} institutions", institutions.len());
        }

        Command::Crawl { no_pause } => {
            config.validate()?;
            let transfer = HttpTransfer::new(&config.transfer)?;
            let gate = gate(no_pause);
            let (session, layout) = open_session(&config).await?;
            let result =
                pipeline::run_crawler(&config, &session, layout, &transfer, gate.as_ref()).await;
            finish(session, result).await?;
        }

        Command::Run { no_pause } => {
            config.validate()?;
            let transfer = HttpTransfer::new(&config.transfer)?;
            let gate = gate(no_pause);
            let (session, layout) = open_session(&config).await?;
            let result =
                pipeline::run_pipeline(&config, &session, layout, &transfer, gate.as_ref()).await;
            finish(session, result).await?;
        }

        Command::Status => {
            pipeline::run_status(&config).await?;
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
        }
    }

    log::info!("Done!");

    Ok(())
}
