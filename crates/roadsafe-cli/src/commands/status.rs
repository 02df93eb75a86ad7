//! `roadsafe status`: Query the status of a running RoadSafe node.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct CallbackCounters {
    received: u64,
    settled: u64,
    settle_failed: u64,
    skipped: u64,
    callback_failed: u64,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    callbacks: CallbackCounters,
    cache_entries: usize,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/status", args.endpoint.trim_end_matches('/'));
    tracing::debug!(%url, "querying node status");
    let resp = reqwest::get(&url).await;

    match resp {
        Ok(r) if r.status().is_success() => {
            let status: StatusResponse = r.json().await?;
            println!("Node Status:");
            println!("  Version:    {}", status.version);
            println!("  Uptime:     {}s", status.uptime_secs);
            println!("  Cache:      {} entries", status.cache_entries);
            println!("Callbacks:");
            println!("  Received:        {}", status.callbacks.received);
            println!("  Settled:         {}", status.callbacks.settled);
            println!("  Settle failed:   {}", status.callbacks.settle_failed);
            println!("  Skipped:         {}", status.callbacks.skipped);
            println!("  Callback failed: {}", status.callbacks.callback_failed);
        }
        Ok(r) => {
            anyhow::bail!("node returned HTTP {}", r.status());
        }
        Err(e) => {
            println!("Could not reach node at {}", args.endpoint);
            println!("  Error: {}", e);
            println!();
            println!("Is the node running? Start it with: roadsafe-node");
        }
    }

    Ok(())
}
