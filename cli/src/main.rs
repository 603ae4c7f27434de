//! netusage CLI
//!
//! Resolves mobile usage templates and reports today's data usage against
//! a recorded platform snapshot.
//!
//! # Usage
//!
//! ```bash
//! netusage --snapshot state.json subscriptions resolve 1
//! netusage --snapshot state.json subscriptions lookup 2
//! netusage --snapshot state.json usage summary --format json
//! netusage --snapshot state.json usage label
//! netusage usage format 1536
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;
mod snapshot;

#[derive(Parser)]
#[command(name = "netusage")]
#[command(version)]
#[command(about = "Mobile data usage template resolution and reporting", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "NETUSAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Platform snapshot to replay
    #[arg(long, env = "NETUSAGE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscription resolution
    Subscriptions {
        #[command(subcommand)]
        action: SubscriptionCommands,
    },
    /// Data usage
    Usage {
        #[command(subcommand)]
        action: UsageCommands,
    },
}

#[derive(Subcommand)]
enum SubscriptionCommands {
    /// Print the template usage is queried against
    Resolve {
        #[arg(allow_negative_numbers = true)]
        subscription_id: i32,
    },
    /// Fetch subscription info in the background
    Lookup {
        #[arg(allow_negative_numbers = true)]
        subscription_id: i32,
    },
}

#[derive(Subcommand)]
enum UsageCommands {
    /// Today's upload/download per transport
    Summary,
    /// One-line usage label for the active network
    Label,
    /// Format a byte count
    Format { bytes: u64 },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::NetUsageConfig::load_or_default(cli.config.as_deref());

    let snapshot = match &cli.snapshot {
        Some(path) => snapshot::Snapshot::load(path)?,
        None => {
            tracing::warn!("No snapshot given, platform state is empty");
            snapshot::Snapshot::default()
        }
    };
    let services = commands::Services::new(&config, snapshot.into_platform())?;

    match cli.command {
        Commands::Subscriptions { action } => commands::subscriptions::handle(action, &services, cli.format).await,
        Commands::Usage { action } => commands::usage::handle(action, &services, cli.format).await,
    }
}
