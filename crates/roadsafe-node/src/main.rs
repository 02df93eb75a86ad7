//! RoadSafe Node: entry point.
//!
//! Serves the payment gateway callback routes with configuration from a TOML
//! file or defaults.

mod api;
mod config;
mod node;
mod state;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::RoadsafeConfig;
use node::RoadsafeNode;

/// RoadSafe Node
#[derive(Parser, Debug)]
#[command(name = "roadsafe-node", version, about = "RoadSafe payment callback server")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "roadsafe.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the backend base URL.
    #[arg(long)]
    backend_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(config: &RoadsafeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = if args.init {
        RoadsafeConfig::default()
    } else {
        RoadsafeConfig::load(&args.config)?
    };

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(ref backend_url) = args.backend_url {
        config.backend.base_url = backend_url.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config);

    if args.init {
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    tracing::info!("RoadSafe Node v{}", env!("CARGO_PKG_VERSION"));

    let mut node = RoadsafeNode::new(config)?;
    let addr = node.start().await?;
    tracing::info!(%addr, "listening for payment callbacks");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("received shutdown signal");
    };

    node.run(shutdown).await?;
    tracing::info!("RoadSafe node exited cleanly");
    Ok(())
}
