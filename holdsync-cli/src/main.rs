mod commands;
mod config;
mod driver;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "holdsync")]
#[command(about = "Mirror busy time from source calendars as hold events on target calendars")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "holdsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a sync would change, without touching any calendar
    Plan,
    /// Run one reconciliation pass over every mapping
    Sync,
    /// Poll for source changes and reconcile until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Plan => commands::plan::run(&config).await,
        Commands::Sync => commands::sync::run(&config).await,
        Commands::Watch => commands::watch::run(&config).await,
    }
}
