use std::fmt;

use crate::error::ReconcileError;

/// States one inbound callback passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CallbackState {
    /// The request arrived and its parameters were read.
    Received,
    /// A settlement call was sent to the backend.
    BackendCallAttempted,
    /// The backend acknowledged the settlement.
    Settled,
    /// The backend call failed or was not acknowledged.
    SettleFailed,
    /// The browser was sent to an outcome page. Final state.
    Redirected,
}

impl CallbackState {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Redirected)
    }
}

impl fmt::Display for CallbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => write!(f, "Received"),
            Self::BackendCallAttempted => write!(f, "BackendCallAttempted"),
            Self::Settled => write!(f, "Settled"),
            Self::SettleFailed => write!(f, "SettleFailed"),
            Self::Redirected => write!(f, "Redirected"),
        }
    }
}

/// Events that move a callback between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackEvent {
    /// All identifying fields present and the gateway reported success.
    SettlementStarted,
    /// The backend acknowledged the settlement.
    BackendAcknowledged,
    /// The backend errored or returned a non-success acknowledgment.
    BackendFailed,
    /// The redirect response was built.
    RedirectIssued,
}

/// Valid transitions:
/// - Received → BackendCallAttempted (SettlementStarted)
/// - Received → Redirected (RedirectIssued, settlement skipped)
/// - BackendCallAttempted → Settled (BackendAcknowledged)
/// - BackendCallAttempted → SettleFailed (BackendFailed)
/// - Settled → Redirected (RedirectIssued)
/// - SettleFailed → Redirected (RedirectIssued)
pub struct CallbackStateMachine;

impl CallbackStateMachine {
    pub fn transition(
        current: CallbackState,
        event: CallbackEvent,
    ) -> Result<CallbackState, ReconcileError> {
        let next = match (current, event) {
            (CallbackState::Received, CallbackEvent::SettlementStarted) => {
                CallbackState::BackendCallAttempted
            }
            (CallbackState::Received, CallbackEvent::RedirectIssued) => CallbackState::Redirected,

            (CallbackState::BackendCallAttempted, CallbackEvent::BackendAcknowledged) => {
                CallbackState::Settled
            }
            (CallbackState::BackendCallAttempted, CallbackEvent::BackendFailed) => {
                CallbackState::SettleFailed
            }

            (CallbackState::Settled, CallbackEvent::RedirectIssued)
            | (CallbackState::SettleFailed, CallbackEvent::RedirectIssued) => {
                CallbackState::Redirected
            }

            _ => {
                let target = match event {
                    CallbackEvent::SettlementStarted => CallbackState::BackendCallAttempted,
                    CallbackEvent::BackendAcknowledged => CallbackState::Settled,
                    CallbackEvent::BackendFailed => CallbackState::SettleFailed,
                    CallbackEvent::RedirectIssued => CallbackState::Redirected,
                };
                return Err(ReconcileError::InvalidTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(from = %current, to = %next, event = ?event, "callback state transition");
        Ok(next)
    }

    pub fn can_transition(current: CallbackState, event: CallbackEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

/// The states a single callback has visited, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePath {
    states: Vec<CallbackState>,
}

impl StatePath {
    pub fn new() -> Self {
        Self {
            states: vec![CallbackState::Received],
        }
    }

    pub fn current(&self) -> CallbackState {
        self.states
            .last()
            .copied()
            .unwrap_or(CallbackState::Received)
    }

    pub fn advance(&mut self, event: CallbackEvent) -> Result<CallbackState, ReconcileError> {
        let next = CallbackStateMachine::transition(self.current(), event)?;
        self.states.push(next);
        Ok(next)
    }

    pub fn into_states(self) -> Vec<CallbackState> {
        self.states
    }
}

impl Default for StatePath {
    fn default() -> Self {
        Self::new()
    }
}
