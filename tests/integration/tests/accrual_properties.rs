//! Integration test: late-fee accrual properties over realistic timelines.

use chrono::{DateTime, Duration, Utc};
use roadsafe_core::{accrual, Debt, DebtSummary, LateFeePolicy, LiabilityStatus, Money};

fn at(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().unwrap()
}

fn debt(id: &str, major: u64, due: &str, status: LiabilityStatus) -> Debt {
    Debt {
        id: id.into(),
        principal: Money::from_major(major).unwrap(),
        due_date: at(due),
        created_at: at("2023-12-01T00:00:00Z"),
        status,
        description: None,
    }
}

#[test]
fn test_owed_never_decreases_over_time() {
    let principal = Money::parse("1234.56").unwrap();
    let due = at("2024-03-01T00:00:00Z");

    let mut previous = Money::ZERO;
    for hours in (0..24 * 120).step_by(7) {
        let owed = accrual::owed(principal, due, due + Duration::hours(hours));
        assert!(owed >= previous, "owed dropped at +{}h", hours);
        assert!(owed >= principal);
        previous = owed;
    }
}

#[test]
fn test_fee_is_flat_inside_each_period() {
    let principal = Money::from_major(1000).unwrap();
    let due = at("2024-01-01T00:00:00Z");

    // Periods start right after the 7-day grace window.
    let first_period = [8, 10, 14];
    for days in first_period {
        assert_eq!(
            accrual::owed(principal, due, due + Duration::days(days)).to_string(),
            "1025.00"
        );
    }
    assert_eq!(
        accrual::owed(principal, due, due + Duration::days(15)).to_string(),
        "1050.00"
    );
}

#[test]
fn test_grace_boundary() {
    let principal = Money::from_major(1000).unwrap();
    let due = at("2024-01-01T00:00:00Z");
    let grace_end = due + Duration::days(7);

    assert_eq!(accrual::late_fee(principal, due, grace_end), Money::ZERO);
    assert_eq!(
        accrual::late_fee(principal, due, grace_end + Duration::milliseconds(1)).to_string(),
        "25.00"
    );
}

#[test]
fn test_before_due_date_owes_principal() {
    let principal = Money::from_major(1000).unwrap();
    let due = at("2024-01-01T00:00:00Z");
    assert_eq!(
        accrual::owed(principal, due, due - Duration::days(30)),
        principal
    );
}

#[test]
fn test_custom_policy_quote() {
    let policy = LateFeePolicy::new(Duration::days(0), Duration::days(30), 1000).unwrap();
    let quote = policy.quote(
        Money::from_major(200).unwrap(),
        at("2024-01-01T00:00:00Z"),
        at("2024-02-15T00:00:00Z"),
    );
    assert_eq!(quote.weeks_late, 2);
    assert_eq!(quote.late_fee.to_string(), "40.00");
    assert_eq!(quote.owed.to_string(), "240.00");
}

#[test]
fn test_summary_over_mixed_portfolio() {
    let now = at("2024-02-01T00:00:00Z");
    let debts = vec![
        debt("D1", 1000, "2024-01-01T00:00:00Z", LiabilityStatus::Unpaid),
        debt("D2", 500, "2024-01-28T00:00:00Z", LiabilityStatus::Unpaid),
        debt("D3", 9999, "2023-01-01T00:00:00Z", LiabilityStatus::Paid),
    ];

    let summary = DebtSummary::from_debts(&debts, now);

    // D1: 31 days overdue, 24 past grace, 4 started periods, 10% fee.
    assert_eq!(summary.count, 2);
    assert_eq!(summary.principal.to_string(), "1500.00");
    assert_eq!(summary.late_fee.to_string(), "100.00");
    assert_eq!(summary.total.to_string(), "1600.00");
    assert_eq!(summary.oldest_due_date, Some(at("2024-01-01T00:00:00Z")));
}
