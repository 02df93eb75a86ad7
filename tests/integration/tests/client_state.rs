//! Integration test: cached client state around a settlement.
//!
//! A settled payment makes cached listings stale; the owning slice family
//! is dropped and the next read goes back to the backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use roadsafe_api::ApiClient;
use roadsafe_cache::TtlCache;
use roadsafe_client::ClientStore;
use roadsafe_core::{Liability, LiabilityStatus, SubjectType};
use roadsafe_integration_tests::{unpaid_debt, MockBackend};
use roadsafe_reconciler::{
    CallbackKind, CallbackParams, InboundMethod, Reconciler, ReconcilerConfig,
};

fn at(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().unwrap()
}

async fn setup() -> (Arc<MockBackend>, ClientStore, Reconciler) {
    let backend = MockBackend::with_debts(vec![
        unpaid_debt("D1", 1000, "2024-01-01T00:00:00Z"),
        unpaid_debt("D2", 400, "2024-01-10T00:00:00Z"),
    ]);
    let api = ApiClient::new(backend.spawn().await).unwrap();
    let store = ClientStore::new(api.clone(), Arc::new(TtlCache::new()));
    let reconciler = Reconciler::new(Arc::new(api), ReconcilerConfig::default());
    (backend, store, reconciler)
}

fn paid_callback(debt_id: &str) -> CallbackParams {
    CallbackParams::from_pairs([
        ("type", "debt"),
        ("debtId", debt_id),
        ("tran_id", "T-100"),
        ("status", "VALID"),
    ])
}

#[tokio::test]
async fn test_settlement_then_invalidate_shows_paid_debt() {
    let (backend, store, reconciler) = setup().await;
    let now = at("2024-01-15T00:00:00Z");

    let before = store.debt_summary(now).await.unwrap();
    assert_eq!(before.count, 2);
    // D1 is one period late (1025.00); D2 is still inside its grace window.
    assert_eq!(before.total.to_string(), "1425.00");

    let report = reconciler
        .handle(CallbackKind::Success, InboundMethod::Post, &paid_callback("D1"))
        .await;
    assert!(report.settlement_attempted());
    store.after_payment(SubjectType::Debt);

    let debts = store.debts().await.unwrap();
    let d1 = debts.iter().find(|d| d.id == "D1").unwrap();
    assert_eq!(d1.status, LiabilityStatus::Paid);
    assert!(!d1.is_unpaid());

    let after = store.debt_summary(now).await.unwrap();
    assert_eq!(after.count, 1);
    assert_eq!(after.total.to_string(), "400.00");
    assert_eq!(backend.debt_reads(), 2);
}

#[tokio::test]
async fn test_stale_listing_served_until_invalidated() {
    let (backend, store, reconciler) = setup().await;

    store.debts().await.unwrap();
    reconciler
        .handle(CallbackKind::Success, InboundMethod::Post, &paid_callback("D1"))
        .await;

    // Still inside the TTL and nothing invalidated: cached copy wins.
    let cached = store.debts().await.unwrap();
    assert!(cached.iter().all(|d| d.is_unpaid()));
    assert_eq!(backend.debt_reads(), 1);

    // A fine payment does not touch the debt family.
    store.after_payment(SubjectType::Fine);
    store.debts().await.unwrap();
    assert_eq!(backend.debt_reads(), 1);
}
