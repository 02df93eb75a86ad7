//! Integration test: gateway callbacks through the reconciler into a live
//! HTTP backend.
//!
//! Exercises roadsafe-reconciler, roadsafe-api and roadsafe-core together
//! against the in-process mock backend.

use std::sync::Arc;

use roadsafe_api::types::{DEBT_PAYMENT_PATH, FINE_PAYMENT_PATH};
use roadsafe_api::{ApiClient, ApiError};
use roadsafe_integration_tests::{MockBackend, Reply};
use roadsafe_reconciler::{
    CallbackKind, CallbackParams, CallbackState, InboundMethod, Reconciler, ReconcilerConfig,
    RedirectStatus, SettlementOutcome,
};
use serde_json::json;

fn reconciler_for(base_url: &str) -> Reconciler {
    let api = ApiClient::new(base_url).expect("valid backend url");
    Reconciler::new(Arc::new(api), ReconcilerConfig::default())
}

fn form(body: &str) -> CallbackParams {
    CallbackParams::from_parts(None, body.as_bytes())
}

// =========================================================================
// Happy paths
// =========================================================================

#[tokio::test]
async fn test_debt_server_post_settles_with_full_body() {
    let backend = MockBackend::new();
    let rec = reconciler_for(&backend.spawn().await);

    let report = rec
        .handle(
            CallbackKind::Success,
            InboundMethod::Post,
            &form("type=debt&debtId=D1&tran_id=T1&val_id=V1&amount=500.00&status=VALID"),
        )
        .await;

    let settlements = backend.settlements();
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].path, DEBT_PAYMENT_PATH);
    assert_eq!(
        settlements[0].body,
        json!({"debtId": "D1", "transactionId": "T1", "amount": 500, "valId": "V1"})
    );

    assert!(matches!(report.outcome, Some(SettlementOutcome::Settled { .. })));
    assert_eq!(report.final_state(), Some(CallbackState::Redirected));
    assert_eq!(report.redirect.status, RedirectStatus::SeeOther);
    assert_eq!(
        report.redirect.target.to_uri(),
        "/payment/success?type=debt&debtId=D1&transactionId=T1"
    );
}

#[tokio::test]
async fn test_fine_browser_redirect_uses_fine_endpoint() {
    let backend = MockBackend::new();
    let rec = reconciler_for(&backend.spawn().await);

    let params = CallbackParams::from_parts(
        Some("type=fine&fineId=F42&transactionId=T9&valId=V9&status=VALID"),
        b"",
    );
    let report = rec
        .handle(CallbackKind::Success, InboundMethod::Get, &params)
        .await;

    let settlements = backend.settlements();
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].path, FINE_PAYMENT_PATH);
    assert_eq!(
        settlements[0].body,
        json!({"fineId": "F42", "transactionId": "T9", "valId": "V9"})
    );
    assert_eq!(report.redirect.status, RedirectStatus::Temporary);
    assert_eq!(
        report.redirect.target.to_uri(),
        "/payment/success?type=fine&fineId=F42&transactionId=T9"
    );
}

// =========================================================================
// Backend trouble never changes the destination
// =========================================================================

#[tokio::test]
async fn test_backend_error_still_lands_on_success_page() {
    let backend = MockBackend::new();
    backend.set_reply(Reply::ServerError);
    let rec = reconciler_for(&backend.spawn().await);

    let report = rec
        .handle(
            CallbackKind::Success,
            InboundMethod::Post,
            &form("type=debt&debtId=D1&tran_id=T1&status=VALID"),
        )
        .await;

    match report.outcome {
        Some(SettlementOutcome::Failed {
            error: ApiError::Status { status, ref message },
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        ref other => panic!("expected backend status failure, got {:?}", other),
    }
    assert!(report.states.contains(&CallbackState::SettleFailed));
    assert!(report
        .redirect
        .target
        .to_uri()
        .starts_with("/payment/success?"));
    assert_eq!(rec.stats().settle_failed, 1);
}

#[tokio::test]
async fn test_unacknowledged_settlement_is_a_failure() {
    let backend = MockBackend::new();
    backend.set_reply(Reply::Reject("Debt already paid".into()));
    let rec = reconciler_for(&backend.spawn().await);

    let report = rec
        .handle(
            CallbackKind::Success,
            InboundMethod::Post,
            &form("type=debt&debtId=D1&tran_id=T1&status=VALID"),
        )
        .await;

    assert_eq!(
        report.outcome,
        Some(SettlementOutcome::Failed {
            error: ApiError::Rejected("Debt already paid".into())
        })
    );
    assert_eq!(report.redirect.target.path, "/payment/success");
}

#[tokio::test]
async fn test_unreachable_backend_still_redirects() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let rec = reconciler_for(&format!("http://{}", addr));
    let report = rec
        .handle(
            CallbackKind::Success,
            InboundMethod::Post,
            &form("type=debt&debtId=D1&tran_id=T1&status=VALID"),
        )
        .await;

    assert!(matches!(
        report.outcome,
        Some(SettlementOutcome::Failed {
            error: ApiError::Transport(_)
        })
    ));
    assert_eq!(report.redirect.target.path, "/payment/success");
}

// =========================================================================
// Non-success routes and skipped settlement
// =========================================================================

#[tokio::test]
async fn test_failure_and_cancel_never_contact_backend() {
    let backend = MockBackend::new();
    let rec = reconciler_for(&backend.spawn().await);

    let failed = rec
        .handle(
            CallbackKind::Failure,
            InboundMethod::Post,
            &form("type=debt&debtId=D1&tran_id=T1&status=FAILED"),
        )
        .await;
    let cancelled = rec
        .handle(
            CallbackKind::Cancel,
            InboundMethod::Get,
            &form("type=fine&fineId=F1"),
        )
        .await;

    assert!(backend.settlements().is_empty());
    assert_eq!(
        failed.redirect.target.to_uri(),
        "/payment/failed?type=debt&debtId=D1&transactionId=T1&error=payment_failed"
    );
    assert_eq!(
        cancelled.redirect.target.to_uri(),
        "/payment/cancelled?type=fine&fineId=F1"
    );
}

#[tokio::test]
async fn test_missing_transaction_id_skips_settlement() {
    let backend = MockBackend::new();
    let rec = reconciler_for(&backend.spawn().await);

    let report = rec
        .handle(
            CallbackKind::Success,
            InboundMethod::Post,
            &form("type=debt&debtId=D1&status=VALID"),
        )
        .await;

    assert!(backend.settlements().is_empty());
    assert!(!report.settlement_attempted());
    assert_eq!(report.redirect.target.to_uri(), "/payment/success?type=debt&debtId=D1");
    assert_eq!(rec.stats().skipped, 1);
}

// =========================================================================
// Duplicate notifications
// =========================================================================

#[tokio::test]
async fn test_both_channels_forward_settlement_to_backend() {
    let backend = MockBackend::new();
    let rec = reconciler_for(&backend.spawn().await);

    let server_post = form("type=debt&debtId=D1&tran_id=T1&val_id=V1&status=VALID");
    let browser_get = CallbackParams::from_parts(
        Some("type=debt&debtId=D1&tran_id=T1&val_id=V1&status=VALID"),
        b"",
    );

    let (a, b) = futures::future::join(
        rec.handle(CallbackKind::Success, InboundMethod::Post, &server_post),
        rec.handle(CallbackKind::Success, InboundMethod::Get, &browser_get),
    )
    .await;

    // The backend dedupes on transaction id; both calls reach it.
    let settlements = backend.settlements();
    assert_eq!(settlements.len(), 2);
    assert!(settlements
        .iter()
        .all(|s| s.body["transactionId"] == "T1"));

    assert_eq!(a.redirect.status, RedirectStatus::SeeOther);
    assert_eq!(b.redirect.status, RedirectStatus::Temporary);
    assert_eq!(a.redirect.target, b.redirect.target);
    assert_ne!(a.request_id, b.request_id);

    let stats = rec.stats();
    assert_eq!(stats.received, 2);
    assert_eq!(stats.settled, 2);
}
