//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file, with `SPORTSYNC_API_URL` and
//! `SPORTSYNC_LANGUAGE` overriding the file (a `.env` file is honoured).
//!
//! # Example
//!
//! ```no_run
//! use sportsync::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("sportsync.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::service::ServiceConfig;
use crate::error::{ConfigError, Result};

const API_URL_VAR: &str = "SPORTSYNC_API_URL";
const LANGUAGE_VAR: &str = "SPORTSYNC_LANGUAGE";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Content service endpoint, client context and paging defaults.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// Environment overrides are not applied here; see [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override file values with the ones returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_url) = lookup(API_URL_VAR).filter(|v| !v.is_empty()) {
            self.service.api_url = api_url;
        }
        if let Some(language) = lookup(LANGUAGE_VAR).filter(|v| !v.is_empty()) {
            self.service.language = language;
        }
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let service = &self.service;
        if service.api_url.is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        if let Err(err) = Url::parse(&service.api_url) {
            return Err(ConfigError::InvalidValue {
                field: "api_url",
                reason: err.to_string(),
            }
            .into());
        }
        if service.language.is_empty() {
            return Err(ConfigError::MissingField { field: "language" }.into());
        }
        if service.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_page_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if service.subscribe_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "subscribe_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if service.http.timeout_ms == 0 || service.http.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http",
                reason: "timeouts must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
