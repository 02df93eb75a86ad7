//! RoadSafe Payment Callback Reconciler
//!
//! Turns payment gateway notifications (server-to-server form posts and
//! browser redirects) into at most one backend settlement call, then always
//! resolves to a redirect onto a human-readable outcome page.

pub mod error;
pub mod params;
pub mod state_machine;
pub mod traits;
pub mod redirect;
pub mod reconciler;

pub use error::ReconcileError;
pub use params::CallbackParams;
pub use state_machine::{CallbackEvent, CallbackState, CallbackStateMachine};
pub use traits::SettlementBackend;
pub use redirect::{InboundMethod, OutcomePages, Redirect, RedirectStatus, RedirectTarget};
pub use reconciler::{
    CallbackKind, ReconcileReport, Reconciler, ReconcilerConfig, ReconcilerStats,
    SettlementOutcome, StatsSnapshot,
};
