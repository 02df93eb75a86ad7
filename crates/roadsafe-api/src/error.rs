use serde_json::Value;

/// Backend API errors, normalized at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The one message consumers should show or log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "could not reach the server".into(),
            Self::Status { message, .. } | Self::Rejected(message) => message.clone(),
            Self::Decode(_) => "unexpected response from the server".into(),
            Self::Config(msg) => msg.clone(),
        }
    }

    /// Build a `Status` error from a non-2xx response body.
    ///
    /// The backend reports errors as `{"message": ...}` or `{"error": ...}`;
    /// anything else falls back to the raw body or the status reason.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                ["message", "error"]
                    .iter()
                    .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
            })
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("request failed with status {}", status));

        Self::Status { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}
