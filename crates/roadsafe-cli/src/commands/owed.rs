//! `roadsafe owed`: Compute the amount owed on an overdue principal.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use roadsafe_core::{LateFeePolicy, Money};

#[derive(Args, Debug)]
pub struct OwedArgs {
    /// Principal in major units, e.g. 1000 or 1000.50.
    #[arg(short, long, value_parser = parse_money)]
    pub principal: Money,

    /// Due date (YYYY-MM-DD or RFC 3339).
    #[arg(short, long, value_parser = parse_instant)]
    pub due_date: DateTime<Utc>,

    /// Evaluate at this instant instead of now.
    #[arg(short, long, value_parser = parse_instant)]
    pub now: Option<DateTime<Utc>>,
}

fn parse_money(raw: &str) -> Result<Money, String> {
    Money::parse(raw).map_err(|e| e.to_string())
}

/// A bare date means midnight UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got {}", raw))
}

pub fn run(args: &OwedArgs) -> anyhow::Result<()> {
    let now = args.now.unwrap_or_else(Utc::now);
    let quote = LateFeePolicy::default().quote(args.principal, args.due_date, now);

    println!("Principal:   {}", quote.principal);
    println!("Weeks late:  {}", quote.weeks_late);
    println!("Late fee:    {}", quote.late_fee);
    println!("Owed:        {}", quote.owed);

    Ok(())
}
