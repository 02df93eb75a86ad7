use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::ApiError;
use crate::types::{SettlementAck, SettlementRequest};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the RoadSafe backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "backend URL must be http(s): {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path`, decoding a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let resp = self.http.get(&url).send().await?;
        Self::decode(resp).await
    }

    /// `POST path` with a JSON body, decoding a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let resp = self.http.post(&url).json(body).send().await?;
        Self::decode(resp).await
    }

    /// `DELETE path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "DELETE");
        let resp = self.http.delete(&url).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    /// Ask the backend to settle a debt or fine.
    ///
    /// An acknowledgment with `success: false` is returned as
    /// [`ApiError::Rejected`], so `Ok` always means the backend accepted it.
    pub async fn settle(&self, request: &SettlementRequest) -> Result<SettlementAck, ApiError> {
        let ack: SettlementAck = self.post_json(request.path(), &request.body()).await?;
        if !ack.success {
            return Err(ApiError::Rejected(
                ack.message
                    .unwrap_or_else(|| "settlement not acknowledged".into()),
            ));
        }
        Ok(ack)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        if status == StatusCode::NO_CONTENT {
            return serde_json::from_str("null").map_err(|e| ApiError::Decode(e.to_string()));
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
