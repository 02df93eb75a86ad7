//! Late-fee accrual for overdue debts and fines.
//!
//! Nothing accrues until a grace period past the due date has elapsed. After
//! that, every started period adds a fixed percentage of the principal.
//! Arithmetic is done in integer minor units; the fee is rounded half-up to
//! the nearest minor unit.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Liability, Money};

/// Basis points in one whole.
const BPS_DENOMINATOR: u128 = 10_000;

/// Parameters of the late-fee model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateFeePolicy {
    grace: Duration,
    period: Duration,
    rate_bps: u32,
}

impl LateFeePolicy {
    /// 7-day grace, 7-day periods, 2.5% per period.
    pub const DEFAULT_GRACE_DAYS: i64 = 7;
    pub const DEFAULT_PERIOD_DAYS: i64 = 7;
    pub const DEFAULT_RATE_BPS: u32 = 250;

    pub fn new(grace: Duration, period: Duration, rate_bps: u32) -> Result<Self, CoreError> {
        if grace < Duration::zero() {
            return Err(CoreError::InvalidPolicy("grace period must not be negative".into()));
        }
        if period.num_milliseconds() <= 0 {
            return Err(CoreError::InvalidPolicy("accrual period must be positive".into()));
        }
        Ok(Self {
            grace,
            period,
            rate_bps,
        })
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn rate_bps(&self) -> u32 {
        self.rate_bps
    }

    /// Number of started periods elapsed after the grace window closed.
    ///
    /// Zero while `now <= due_date + grace`; a partial period counts as a
    /// whole one.
    pub fn weeks_late(&self, due_date: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let grace_end = due_date + self.grace;
        if now <= grace_end {
            return 0;
        }

        let overdue_ms = (now - grace_end).num_milliseconds();
        let period_ms = self.period.num_milliseconds();
        let periods = (overdue_ms + period_ms - 1) / period_ms;

        u32::try_from(periods.max(1)).unwrap_or(u32::MAX)
    }

    /// Late fee accrued on `principal` at instant `now`.
    pub fn late_fee(&self, principal: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Money {
        let weeks = self.weeks_late(due_date, now);
        if weeks == 0 {
            return Money::ZERO;
        }

        let scaled = principal.minor() as u128 * self.rate_bps as u128 * weeks as u128;
        let fee = (scaled + BPS_DENOMINATOR / 2) / BPS_DENOMINATOR;
        Money::from_minor(u64::try_from(fee).unwrap_or(u64::MAX))
    }

    /// Total owed: principal plus accrued late fee.
    pub fn owed(&self, principal: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Money {
        principal.saturating_add(self.late_fee(principal, due_date, now))
    }

    /// Full breakdown for one principal.
    pub fn quote(&self, principal: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> AccrualQuote {
        let weeks_late = self.weeks_late(due_date, now);
        let late_fee = self.late_fee(principal, due_date, now);
        AccrualQuote {
            principal,
            late_fee,
            owed: principal.saturating_add(late_fee),
            weeks_late,
        }
    }
}

impl Default for LateFeePolicy {
    fn default() -> Self {
        Self {
            grace: Duration::days(Self::DEFAULT_GRACE_DAYS),
            period: Duration::days(Self::DEFAULT_PERIOD_DAYS),
            rate_bps: Self::DEFAULT_RATE_BPS,
        }
    }
}

/// Amount owed on a single principal, broken down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualQuote {
    pub principal: Money,
    pub late_fee: Money,
    pub owed: Money,
    pub weeks_late: u32,
}

/// Total owed under the default policy.
pub fn owed(principal: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Money {
    LateFeePolicy::default().owed(principal, due_date, now)
}

/// Total owed under the default policy, evaluated at the current time.
pub fn owed_now(principal: Money, due_date: DateTime<Utc>) -> Money {
    owed(principal, due_date, Utc::now())
}

/// Late fee under the default policy.
pub fn late_fee(principal: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> Money {
    LateFeePolicy::default().late_fee(principal, due_date, now)
}

/// Aggregate over all unpaid liabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebtSummary {
    pub count: usize,
    pub principal: Money,
    pub late_fee: Money,
    pub total: Money,
    pub oldest_due_date: Option<DateTime<Utc>>,
}

impl DebtSummary {
    /// Summarize with the default policy.
    pub fn from_debts<'a, L, I>(items: I, now: DateTime<Utc>) -> Self
    where
        L: Liability + 'a,
        I: IntoIterator<Item = &'a L>,
    {
        Self::with_policy(&LateFeePolicy::default(), items, now)
    }

    pub fn with_policy<'a, L, I>(policy: &LateFeePolicy, items: I, now: DateTime<Utc>) -> Self
    where
        L: Liability + 'a,
        I: IntoIterator<Item = &'a L>,
    {
        let mut summary = Self::default();

        for item in items.into_iter().filter(|i| i.is_unpaid()) {
            let fee = policy.late_fee(item.principal(), item.due_date(), now);
            summary.count += 1;
            summary.principal = summary.principal.saturating_add(item.principal());
            summary.late_fee = summary.late_fee.saturating_add(fee);
            summary.oldest_due_date = Some(match summary.oldest_due_date {
                Some(current) => current.min(item.due_date()),
                None => item.due_date(),
            });
        }

        summary.total = summary.principal.saturating_add(summary.late_fee);
        tracing::debug!(
            count = summary.count,
            total = %summary.total,
            "summarized unpaid liabilities"
        );
        summary
    }
}
