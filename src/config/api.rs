//! Dashboard API configuration

use serde::Deserialize;
use std::time::Duration;

use super::client::Environment;
use super::error::ValidationError;
use crate::adapters::HttpGatewayConfig;

/// Where the dashboard API lives and how long to wait for it
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.dominionbank.example`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings for the HTTP gateway adapter
    pub fn gateway_config(&self) -> HttpGatewayConfig {
        HttpGatewayConfig::new(self.base_url.clone()).with_timeout(self.request_timeout())
    }

    /// Validate API configuration
    ///
    /// Production deployments must talk to the API over HTTPS.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ValidationError::MissingRequired("api.base_url"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if environment == Environment::Production && !base_url.starts_with("https://") {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
