//! Content service configuration: REST endpoint, client context and paging.

use serde::Deserialize;

use crate::application::{ProviderSettings, RegistrarSettings};

/// HTTP client timeouts for the subscribe / unsubscribe calls.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in milliseconds (default: 5000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// TCP connect timeout in milliseconds (default: 2000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    5_000
}

const fn default_connect_timeout_ms() -> u64 {
    2_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Settings of the content service the engine subscribes against.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of `services/content/subscribe` and `services/content/unsubscribe`.
    #[serde(default)]
    pub api_url: String,
    /// Language sent in the client context of every request.
    #[serde(default = "default_language")]
    pub language: String,
    /// Client IP address sent in the client context of every request.
    #[serde(default = "default_ip_address")]
    pub ip_address: String,
    /// Page size of event lists when the caller does not pick one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Attempts of an initial subscribe before the call fails.
    #[serde(default = "default_subscribe_attempts")]
    pub subscribe_attempts: u32,
    /// Pause between subscribe attempts in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_language() -> String {
    "en".into()
}

fn default_ip_address() -> String {
    "127.0.0.1".into()
}

const fn default_page_size() -> u32 {
    10
}

const fn default_subscribe_attempts() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    250
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            language: default_language(),
            ip_address: default_ip_address(),
            default_page_size: default_page_size(),
            subscribe_attempts: default_subscribe_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            http: HttpConfig::default(),
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn registrar_settings(&self) -> RegistrarSettings {
        RegistrarSettings {
            max_attempts: self.subscribe_attempts,
            retry_backoff_ms: self.retry_backoff_ms,
        }
    }

    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            default_page_size: self.default_page_size,
        }
    }
}
