//! Node configuration loading and management.

use roadsafe_reconciler::{OutcomePages, ReconcilerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Full configuration for the RoadSafe node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoadsafeConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Backend REST API settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Payment gateway callback settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Read cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// Listen port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API.
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway `status` value that marks a successful payment.
    #[serde(default = "default_valid_status")]
    pub valid_status: String,
    #[serde(default = "default_success_page")]
    pub success_page: String,
    #[serde(default = "default_failed_page")]
    pub failed_page: String,
    #[serde(default = "default_cancelled_page")]
    pub cancelled_page: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied to reads that do not pass their own.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    3000
}
fn default_backend_url() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_valid_status() -> String {
    "VALID".into()
}
fn default_success_page() -> String {
    "/payment/success".into()
}
fn default_failed_page() -> String {
    "/payment/failed".into()
}
fn default_cancelled_page() -> String {
    "/payment/cancelled".into()
}
fn default_ttl_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            valid_status: default_valid_status(),
            success_page: default_success_page(),
            failed_page: default_failed_page(),
            cancelled_page: default_cancelled_page(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RoadsafeConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: RoadsafeConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `listen_addr:port` for the HTTP server.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.default_ttl_secs)
    }

    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            valid_status: self.gateway.valid_status.clone(),
            pages: OutcomePages {
                success: self.gateway.success_page.clone(),
                failed: self.gateway.failed_page.clone(),
                cancelled: self.gateway.cancelled_page.clone(),
            },
        }
    }
}
