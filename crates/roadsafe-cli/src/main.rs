//! RoadSafe CLI: command-line tools for operators.
//!
//! Subcommands: init, owed, debts, status.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// RoadSafe: fines, debts and payments.
#[derive(Parser, Debug)]
#[command(name = "roadsafe", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default node configuration.
    Init(commands::init::InitArgs),
    /// Compute the amount owed on an overdue principal.
    Owed(commands::owed::OwedArgs),
    /// Summarize unpaid debts from the backend.
    Debts(commands::debts::DebtsArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Owed(args) => commands::owed::run(args),
        Commands::Debts(args) => commands::debts::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
