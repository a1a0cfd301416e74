//! Runs sense linking against scene fixtures from the command line.
//!
//! Run with: `cargo run -p vision-cli -- <command>`

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{Modes, Plan, SyncCommand};

/// Sense-linked vision sync for scene fixtures
#[derive(Parser)]
#[command(name = "vision-sync")]
#[command(about = "Dry-run and apply sense linking on RON scene fixtures", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the patches each token would receive, without writing them
    Plan(Plan),

    /// Feed events through the sync worker and print the resulting perception
    Sync(SyncCommand),

    /// List the registered vision and detection modes
    Modes(Modes),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Plan(cmd) => cmd.execute(),
        Command::Sync(cmd) => cmd.execute().await,
        Command::Modes(cmd) => cmd.execute(),
    }
}
