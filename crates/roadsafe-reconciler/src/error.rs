use crate::state_machine::CallbackState;

/// Reconciliation errors. None of these reach the browser; the HTTP layer
/// turns them into a `callback_failed` redirect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("invalid callback state transition from {from} to {to}")]
    InvalidTransition {
        from: CallbackState,
        to: CallbackState,
    },

    #[error("malformed callback: {0}")]
    Malformed(String),

    #[error("unreadable callback request: {0}")]
    Unreadable(String),
}
