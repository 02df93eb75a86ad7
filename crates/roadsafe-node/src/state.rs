//! Shared state for HTTP handlers.

use roadsafe_client::ClientStore;
use roadsafe_core::LateFeePolicy;
use roadsafe_reconciler::Reconciler;
use std::time::Instant;

/// State shared by every request handler.
pub struct AppState {
    /// Gateway callback reconciler.
    pub reconciler: Reconciler,
    /// Cached backend reads; invalidated after settlements.
    pub store: ClientStore,
    /// Late-fee model used for quotes and summaries.
    pub policy: LateFeePolicy,
    /// When the node started.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(reconciler: Reconciler, store: ClientStore) -> Self {
        Self {
            reconciler,
            store,
            policy: LateFeePolicy::default(),
            start_time: Instant::now(),
        }
    }
}
