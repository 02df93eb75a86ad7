//! The RoadSafe node orchestrator.
//!
//! Wires the backend client, read cache and callback reconciler together
//! and runs the HTTP server until shutdown.

use anyhow::Result;
use roadsafe_api::ApiClient;
use roadsafe_cache::TtlCache;
use roadsafe_client::ClientStore;
use roadsafe_reconciler::Reconciler;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::RoadsafeConfig;
use crate::state::AppState;

pub struct RoadsafeNode {
    config: RoadsafeConfig,
    state: Arc<AppState>,
    /// Bound by `start`, consumed by `run`.
    listener: Option<TcpListener>,
}

impl RoadsafeNode {
    pub fn new(config: RoadsafeConfig) -> Result<Self> {
        let api = ApiClient::with_timeout(&config.backend.base_url, config.backend_timeout())?;
        let cache = Arc::new(TtlCache::with_default_ttl(config.cache_ttl()));
        let store = ClientStore::new(api.clone(), cache);
        let reconciler = Reconciler::new(Arc::new(api), config.reconciler_config());

        tracing::info!(
            backend = %config.backend.base_url,
            valid_status = %config.gateway.valid_status,
            "RoadSafe node created"
        );

        Ok(Self {
            config,
            state: Arc::new(AppState::new(reconciler, store)),
            listener: None,
        })
    }

    /// Bind the HTTP listener. Returns the bound address.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.api_addr()).await?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Serve requests until `shutdown` resolves.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        crate::api::serve(listener, self.state.clone(), shutdown).await?;

        let stats = self.state.reconciler.stats();
        tracing::info!(
            received = stats.received,
            settled = stats.settled,
            settle_failed = stats.settle_failed,
            "HTTP API server stopped"
        );
        Ok(())
    }
}
