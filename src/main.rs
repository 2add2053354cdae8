//! ipfs-trawler main entry point
//!
//! This is the command-line interface for the crawler: `add` seeds the hash
//! queue with a root hash, `crawl` runs the worker supervisor.

use clap::{Parser, Subcommand};
use ipfs_trawler::config::{load_config, validate_config, Config};
use ipfs_trawler::queue::{self, CrawlTask, TaskPublisher, TaskQueue, HASHES_QUEUE};
use ipfs_trawler::{index, Worker};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// ipfs-trawler: a distributed content crawler and indexer
#[derive(Parser, Debug)]
#[command(name = "ipfs-trawler")]
#[command(version)]
#[command(about = "A distributed crawler and indexer for content-addressed filesystems", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; defaults apply when omitted
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a hash to the crawler queue
    #[command(alias = "a")]
    Add {
        /// Content hash to seed the crawl with
        hash: String,
    },

    /// Start the crawler
    #[command(alias = "c")]
    Crawl,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => {
            let config = Config::default();
            validate_config(&config)?;
            config
        }
    };

    match cli.command {
        Commands::Add { hash } => handle_add(config, &hash).await?,
        Commands::Crawl => handle_crawl(config).await?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ipfs_trawler=info,warn"),
            1 => EnvFilter::new("ipfs_trawler=debug,info"),
            2 => EnvFilter::new("ipfs_trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `add` subcommand: publishes a root task to the hash queue
async fn handle_add(config: Config, hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    if hash.is_empty() {
        return Err("Please supply a non-empty hash.".into());
    }

    let connection = queue::connect(&config.queue.amqp_url).await?;
    let channel = connection.create_channel().await?;
    let hash_queue = TaskQueue::declare(channel, HASHES_QUEUE).await?;

    hash_queue.publish(&CrawlTask::root(hash)).await?;

    println!("Added hash '{}' to queue", hash);

    connection.close(200, "done").await?;

    Ok(())
}

/// Handles the `crawl` subcommand: runs the worker supervisor until interrupted
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Make sure the index exists before workers start writing to it
    let index = index::Client::new(&config.index)?;
    index.ensure_index().await?;

    let mut worker = Worker::new(config).await?;

    let (error_sink, mut errors) = mpsc::unbounded_channel();
    worker.start(error_sink).await?;

    tracing::info!("Crawler started, waiting for tasks");

    loop {
        tokio::select! {
            Some(failure) = errors.recv() => {
                tracing::error!("Task {} failed: {}", failure.hash, failure.error);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                worker.close().await;
                break;
            }
        }
    }

    Ok(())
}
