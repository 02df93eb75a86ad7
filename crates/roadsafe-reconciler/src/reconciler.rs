use roadsafe_api::{ApiError, SettlementRequest};
use roadsafe_core::PaymentAttempt;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ReconcileError;
use crate::params::{self, CallbackParams};
use crate::redirect::{InboundMethod, OutcomePages, Redirect, RedirectStatus, RedirectTarget};
use crate::state_machine::{CallbackEvent, CallbackState, StatePath};
use crate::traits::SettlementBackend;

/// Marker sent to the outcome page when the callback itself could not be handled.
pub const CALLBACK_FAILED: &str = "callback_failed";
/// Default failure marker when the gateway did not say why.
pub const PAYMENT_FAILED: &str = "payment_failed";

/// Which gateway callback route was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackKind {
    Success,
    Failure,
    Cancel,
}

impl CallbackKind {
    fn outcome_page<'a>(&self, pages: &'a OutcomePages) -> &'a str {
        match self {
            Self::Success => &pages.success,
            Self::Failure => &pages.failed,
            Self::Cancel => &pages.cancelled,
        }
    }

    /// Page used when handling the callback itself fails.
    fn fallback_page<'a>(&self, pages: &'a OutcomePages) -> &'a str {
        match self {
            Self::Success | Self::Failure => &pages.failed,
            Self::Cancel => &pages.cancelled,
        }
    }
}

/// Reconciler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Gateway `status` value meaning the payment went through.
    pub valid_status: String,
    pub pages: OutcomePages,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            valid_status: "VALID".into(),
            pages: OutcomePages::default(),
        }
    }
}

/// Result of the settlement step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    Settled { message: Option<String> },
    Failed { error: ApiError },
}

impl SettlementOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

/// Everything that happened while handling one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub request_id: Uuid,
    pub kind: CallbackKind,
    pub states: Vec<CallbackState>,
    /// `None` when no settlement call was made.
    pub outcome: Option<SettlementOutcome>,
    pub redirect: Redirect,
}

impl ReconcileReport {
    pub fn settlement_attempted(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn final_state(&self) -> Option<CallbackState> {
        self.states.last().copied()
    }
}

/// Running counters, exposed on the node's status endpoint.
#[derive(Debug, Default)]
pub struct ReconcilerStats {
    received: AtomicU64,
    settled: AtomicU64,
    settle_failed: AtomicU64,
    skipped: AtomicU64,
    callback_failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub received: u64,
    pub settled: u64,
    pub settle_failed: u64,
    pub skipped: u64,
    pub callback_failed: u64,
}

impl ReconcilerStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            settled: self.settled.load(Ordering::Relaxed),
            settle_failed: self.settle_failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            callback_failed: self.callback_failed.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Bridges gateway callbacks into backend settlement and outcome redirects.
///
/// Every call resolves to a [`Redirect`]. At most one settlement call is
/// made per call to [`Reconciler::handle`]; duplicates across the gateway's
/// two notification channels are left to the backend.
pub struct Reconciler {
    backend: Arc<dyn SettlementBackend>,
    config: ReconcilerConfig,
    stats: ReconcilerStats,
}

impl Reconciler {
    pub fn new(backend: Arc<dyn SettlementBackend>, config: ReconcilerConfig) -> Self {
        Self {
            backend,
            config,
            stats: ReconcilerStats::default(),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Handle one inbound callback.
    pub async fn handle(
        &self,
        kind: CallbackKind,
        method: InboundMethod,
        params: &CallbackParams,
    ) -> ReconcileReport {
        let request_id = Uuid::now_v7();
        ReconcilerStats::bump(&self.stats.received);
        tracing::info!(
            %request_id,
            kind = ?kind,
            method = ?method,
            transaction_id = params.transaction_id().unwrap_or("-"),
            "payment callback received"
        );

        match self.try_handle(request_id, kind, method, params).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(%request_id, error = %e, "payment callback handling failed");
                self.failure_report(request_id, kind, method)
            }
        }
    }

    /// Report for a callback whose request could not even be read.
    pub fn unreadable(
        &self,
        kind: CallbackKind,
        method: InboundMethod,
        error: &ReconcileError,
    ) -> ReconcileReport {
        let request_id = Uuid::now_v7();
        ReconcilerStats::bump(&self.stats.received);
        tracing::error!(%request_id, kind = ?kind, %error, "unreadable payment callback");
        self.failure_report(request_id, kind, method)
    }

    async fn try_handle(
        &self,
        request_id: Uuid,
        kind: CallbackKind,
        method: InboundMethod,
        params: &CallbackParams,
    ) -> Result<ReconcileReport, ReconcileError> {
        let mut path = StatePath::new();
        let mut outcome = None;

        if kind == CallbackKind::Success {
            match self.eligible_attempt(params) {
                Ok(attempt) => {
                    path.advance(CallbackEvent::SettlementStarted)?;
                    let result = self.settle(request_id, &attempt).await;
                    let event = if result.is_settled() {
                        CallbackEvent::BackendAcknowledged
                    } else {
                        CallbackEvent::BackendFailed
                    };
                    path.advance(event)?;
                    outcome = Some(result);
                }
                Err(reason) => {
                    ReconcilerStats::bump(&self.stats.skipped);
                    tracing::info!(%request_id, %reason, "settlement skipped");
                }
            }
        }

        let target = self.target_for(kind, params);
        path.advance(CallbackEvent::RedirectIssued)?;

        let redirect = Redirect {
            target,
            status: RedirectStatus::for_method(method),
        };
        tracing::info!(
            %request_id,
            location = %redirect.target,
            status = redirect.status.code(),
            "redirecting to outcome page"
        );

        Ok(ReconcileReport {
            request_id,
            kind,
            states: path.into_states(),
            outcome,
            redirect,
        })
    }

    /// The payment attempt to settle, or why settlement is skipped.
    fn eligible_attempt(&self, params: &CallbackParams) -> Result<PaymentAttempt, ReconcileError> {
        let attempt = params.payment_attempt()?;
        match params.status() {
            Some(status) if status == self.config.valid_status => Ok(attempt),
            Some(status) => Err(ReconcileError::Malformed(format!(
                "gateway status {} is not {}",
                status, self.config.valid_status
            ))),
            None => Err(ReconcileError::Malformed("missing status".into())),
        }
    }

    async fn settle(&self, request_id: Uuid, attempt: &PaymentAttempt) -> SettlementOutcome {
        let request = SettlementRequest {
            subject: attempt.subject.clone(),
            transaction_id: attempt.transaction_id.clone(),
            amount: attempt.amount,
            validation_id: attempt.validation_id.clone(),
        };

        match self.backend.settle(&request).await {
            Ok(ack) => {
                ReconcilerStats::bump(&self.stats.settled);
                tracing::info!(
                    %request_id,
                    subject = %attempt.subject,
                    transaction_id = %attempt.transaction_id,
                    "settlement acknowledged"
                );
                SettlementOutcome::Settled {
                    message: ack.message,
                }
            }
            Err(error) => {
                ReconcilerStats::bump(&self.stats.settle_failed);
                tracing::warn!(
                    %request_id,
                    subject = %attempt.subject,
                    transaction_id = %attempt.transaction_id,
                    %error,
                    "settlement failed; redirecting anyway"
                );
                SettlementOutcome::Failed { error }
            }
        }
    }

    fn target_for(&self, kind: CallbackKind, params: &CallbackParams) -> RedirectTarget {
        let target = RedirectTarget::new(kind.outcome_page(&self.config.pages))
            .with_opt(params::TYPE, params.subject_type_raw())
            .with_opt(params::DEBT_ID, params.debt_id())
            .with_opt(params::FINE_ID, params.fine_id())
            .with_opt(params::TRANSACTION_ID, params.transaction_id());

        if kind != CallbackKind::Failure {
            return target;
        }
        match (params.error(), params.message()) {
            (Some(error), _) => target.with(params::ERROR, error),
            (None, Some(message)) => target.with(params::MESSAGE, message),
            (None, None) => target.with(params::ERROR, PAYMENT_FAILED),
        }
    }

    fn failure_report(
        &self,
        request_id: Uuid,
        kind: CallbackKind,
        method: InboundMethod,
    ) -> ReconcileReport {
        ReconcilerStats::bump(&self.stats.callback_failed);
        let target = RedirectTarget::new(kind.fallback_page(&self.config.pages))
            .with(params::ERROR, CALLBACK_FAILED);
        ReconcileReport {
            request_id,
            kind,
            states: vec![CallbackState::Received, CallbackState::Redirected],
            outcome: None,
            redirect: Redirect {
                target,
                status: RedirectStatus::for_method(method),
            },
        }
    }
}
