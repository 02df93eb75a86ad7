//! HTTP API server for the RoadSafe node.
//!
//! Hosts the payment gateway callback routes, which always answer with a
//! redirect, plus JSON endpoints for health, status, late-fee quotes and
//! the cached debt summary.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::JsonRejection, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use roadsafe_core::{AccrualQuote, DebtSummary, Money};
use roadsafe_reconciler::{
    CallbackKind, CallbackParams, InboundMethod, ReconcileError, Redirect, RedirectStatus,
    SettlementOutcome, StatsSnapshot,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

// --- Response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub callbacks: StatsSnapshot,
    pub cache_entries: usize,
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub principal: Money,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// --- Gateway callbacks ---

async fn handle_success(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    callback(&state, CallbackKind::Success, method, uri, body).await
}

async fn handle_fail(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    callback(&state, CallbackKind::Failure, method, uri, body).await
}

async fn handle_cancel(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    callback(&state, CallbackKind::Cancel, method, uri, body).await
}

async fn callback(
    state: &AppState,
    kind: CallbackKind,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let inbound = InboundMethod::from_name(method.as_str());

    let report = match body {
        Ok(body) => {
            let params = CallbackParams::from_parts(uri.query(), &body);
            let report = state.reconciler.handle(kind, inbound, &params).await;
            if let Some(SettlementOutcome::Settled { .. }) = report.outcome {
                if let Ok(subject) = params.subject() {
                    state.store.after_payment(subject.kind);
                }
            }
            report
        }
        Err(rejection) => state.reconciler.unreadable(
            kind,
            inbound,
            &ReconcileError::Unreadable(rejection.body_text()),
        ),
    };

    redirect_response(&report.redirect)
}

fn redirect_response(redirect: &Redirect) -> Response {
    let location = redirect.target.to_uri();
    match redirect.status {
        RedirectStatus::SeeOther => axum::response::Redirect::to(&location).into_response(),
        RedirectStatus::Temporary => axum::response::Redirect::temporary(&location).into_response(),
    }
}

// --- JSON endpoints ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        callbacks: state.reconciler.stats(),
        cache_entries: state.store.cache().len(),
    })
}

async fn handle_quote(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<AccrualQuote> {
    let Json(req) = body.map_err(|e| error(StatusCode::BAD_REQUEST, e.body_text()))?;
    let now = req.now.unwrap_or_else(Utc::now);
    Ok(Json(state.policy.quote(req.principal, req.due_date, now)))
}

async fn handle_debt_summary(State(state): State<Arc<AppState>>) -> ApiResult<DebtSummary> {
    let debts = state.store.debts().await.map_err(|e| {
        tracing::warn!(error = %e, "debt listing failed");
        error(StatusCode::BAD_GATEWAY, e.user_message())
    })?;
    Ok(Json(DebtSummary::with_policy(
        &state.policy,
        &debts,
        Utc::now(),
    )))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/payment/success", get(handle_success).post(handle_success))
        .route("/api/payment/fail", get(handle_fail).post(handle_fail))
        .route("/api/payment/cancel", get(handle_cancel).post(handle_cancel))
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/accrual/quote", post(handle_quote))
        .route("/api/v1/debts/summary", get(handle_debt_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listen_addr: SocketAddr = listener.local_addr()?;
    let app = build_router(state);
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
