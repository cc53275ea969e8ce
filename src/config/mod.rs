//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DOMINION` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use dominion_session::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Talking to {}", config.api.base_url);
//! ```

mod api;
mod client;
mod credentials;
mod error;

pub use api::ApiConfig;
pub use client::{ClientConfig, Environment, LogFormat};
pub use credentials::CredentialsConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a development
/// setup pointed at a local API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and logging
    #[serde(default)]
    pub client: ClientConfig,

    /// Dashboard API location and timeout
    #[serde(default)]
    pub api: ApiConfig,

    /// Credential persistence
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DOMINION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DOMINION__API__BASE_URL=https://...` -> `api.base_url = https://...`
    /// - `DOMINION__CLIENT__LOG_FORMAT=json` -> `client.log_format = json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DOMINION")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.client.validate()?;
        self.api.validate(self.client.environment)?;
        self.credentials.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.client.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DOMINION__CLIENT__ENVIRONMENT",
        "DOMINION__CLIENT__LOG_FORMAT",
        "DOMINION__API__BASE_URL",
        "DOMINION__API__REQUEST_TIMEOUT_SECS",
        "DOMINION__CREDENTIALS__PATH",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.client.environment, Environment::Development);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DOMINION__API__BASE_URL", "https://api.dominionbank.example");
        env::set_var("DOMINION__API__REQUEST_TIMEOUT_SECS", "10");
        env::set_var("DOMINION__CLIENT__LOG_FORMAT", "json");
        env::set_var("DOMINION__CREDENTIALS__PATH", "/tmp/dominion/token.json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.api.base_url, "https://api.dominionbank.example");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.client.log_format, LogFormat::Json);
        assert_eq!(
            config.credentials.path,
            std::path::PathBuf::from("/tmp/dominion/token.json")
        );
    }

    #[test]
    fn test_production_requires_https_api() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DOMINION__CLIENT__ENVIRONMENT", "production");
        env::set_var("DOMINION__API__BASE_URL", "http://api.dominionbank.example");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::BaseUrlMustBeHttps));
    }
}
