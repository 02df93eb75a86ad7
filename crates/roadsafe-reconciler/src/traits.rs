use async_trait::async_trait;
use roadsafe_api::{ApiClient, ApiError, SettlementAck, SettlementRequest};

/// The backend collaborator that marks a debt or fine as paid.
///
/// Implementations must treat settlement as idempotent per transaction id:
/// the reconciler forwards duplicate gateway notifications unchanged.
#[async_trait]
pub trait SettlementBackend: Send + Sync {
    /// Settle one subject. `Ok` means the backend acknowledged success.
    async fn settle(&self, request: &SettlementRequest) -> Result<SettlementAck, ApiError>;
}

#[async_trait]
impl SettlementBackend for ApiClient {
    async fn settle(&self, request: &SettlementRequest) -> Result<SettlementAck, ApiError> {
        ApiClient::settle(self, request).await
    }
}
