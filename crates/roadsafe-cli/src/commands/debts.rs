//! `roadsafe debts`: Summarize unpaid debts from the backend.

use chrono::Utc;
use clap::Args;
use roadsafe_api::ApiClient;
use roadsafe_cache::TtlCache;
use roadsafe_client::ClientStore;
use roadsafe_core::{Liability, LateFeePolicy};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct DebtsArgs {
    /// Base URL of the backend REST API.
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    pub backend: String,
}

pub async fn run(args: &DebtsArgs) -> anyhow::Result<()> {
    let store = ClientStore::new(ApiClient::new(&args.backend)?, Arc::new(TtlCache::new()));
    let now = Utc::now();
    let policy = LateFeePolicy::default();
    tracing::debug!(backend = %args.backend, "loading debts");

    let debts = match store.debts().await {
        Ok(debts) => debts,
        Err(e) => {
            println!("Could not load debts from {}", args.backend);
            println!("  Error: {}", e.user_message());
            return Ok(());
        }
    };

    for debt in debts.iter().filter(|d| d.is_unpaid()) {
        let quote = policy.quote(debt.principal, debt.due_date, now);
        println!(
            "  {:<12} due {}  principal {:>10}  owed {:>10}",
            debt.id,
            debt.due_date.format("%Y-%m-%d"),
            quote.principal,
            quote.owed
        );
    }

    let summary = store.debt_summary(now).await?;
    println!();
    println!("Unpaid debts: {}", summary.count);
    println!("  Principal:  {}", summary.principal);
    println!("  Late fees:  {}", summary.late_fee);
    println!("  Total:      {}", summary.total);

    Ok(())
}
