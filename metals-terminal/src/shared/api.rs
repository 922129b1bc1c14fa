/// HTTP client for the metals backend
///
/// Wraps the read endpoints behind the [`MarketDataSource`] seam so the poller
/// and debug overlay can run against any implementation.

use crate::shared::config::{env_millis, env_string};
use crate::shared::error::ApiError;
use crate::shared::types::{ApiResponse, DebugRecord, InventorySnapshot, PriceSnapshot};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Backend client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL, endpoints are appended to it
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ApiConfig {
    /// Create a new configuration with custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Read `METALS_API_URL` and `METALS_REQUEST_TIMEOUT_MS`, keeping defaults otherwise
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("METALS_API_URL", &defaults.base_url),
            request_timeout: env_millis("METALS_REQUEST_TIMEOUT_MS").unwrap_or(defaults.request_timeout),
        }
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL of an endpoint path such as `price/latest`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Read operations the dashboards consume
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest spot/futures quotes keyed by exchange then metal
    async fn get_latest_prices(&self) -> Result<PriceSnapshot, ApiError>;

    /// Latest COMEX (and LME, when stored) warehouse inventory
    async fn get_latest_inventory(&self) -> Result<InventorySnapshot, ApiError>;

    /// Inventory across COMEX, LME and SHFE
    async fn get_aggregated_inventory(&self) -> Result<InventorySnapshot, ApiError>;

    /// Raw backend record and field mapping behind a displayed key
    async fn get_debug_raw(&self, key: &str) -> Result<DebugRecord, ApiError>;
}

/// reqwest-backed [`MarketDataSource`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(ApiConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ApiConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, http }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn request<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Error responses still carry the envelope message when the backend produced them
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<ApiResponse<T>>(&body)?.into_result()
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for ApiClient {
    async fn get_latest_prices(&self) -> Result<PriceSnapshot, ApiError> {
        self.request("price/latest", &[]).await
    }

    async fn get_latest_inventory(&self) -> Result<InventorySnapshot, ApiError> {
        self.request("comex/latest", &[]).await
    }

    async fn get_aggregated_inventory(&self) -> Result<InventorySnapshot, ApiError> {
        self.request("inventory/aggregated", &[]).await
    }

    async fn get_debug_raw(&self, key: &str) -> Result<DebugRecord, ApiError> {
        self.request("debug/raw", &[("key", key)]).await
    }
}
