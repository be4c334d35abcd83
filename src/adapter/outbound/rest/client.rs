//! Content subscription REST client.
//!
//! Both endpoints take the same JSON body:
//!
//! ```json
//! {
//!   "subscriberId": "<session token hash>",
//!   "contentId": { "type": "event", "id": "123" },
//!   "clientContext": { "language": "en", "ipAddress": "127.0.0.1" }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};
use url::Url;

use super::dto::{ClientContext, SubscriptionRequest};
use crate::domain::{ContentIdentifier, TokenHash};
use crate::error::{Result, SubscribeError};
use crate::infrastructure::config::ServiceConfig;
use crate::port::outbound::SubscriptionApi;

const SUBSCRIBE_PATH: &str = "services/content/subscribe";
const UNSUBSCRIBE_PATH: &str = "services/content/unsubscribe";

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Subscribe,
    Unsubscribe,
}

impl Endpoint {
    const fn path(self) -> &'static str {
        match self {
            Self::Subscribe => SUBSCRIBE_PATH,
            Self::Unsubscribe => UNSUBSCRIBE_PATH,
        }
    }
}

/// [`SubscriptionApi`] over HTTP.
pub struct RestSubscriptionApi {
    http: HttpClient,
    base_url: Url,
    language: String,
    ip_address: String,
}

impl RestSubscriptionApi {
    /// Create a client with default HTTP settings.
    pub fn new(base_url: &str, language: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(),
            base_url: normalize_base(base_url)?,
            language: language.into(),
            ip_address: "127.0.0.1".into(),
        })
    }

    /// Create a client with the configured timeouts and client context.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base(&config.api_url)?,
            language: config.language.clone(),
            ip_address: config.ip_address.clone(),
        })
    }

    async fn post(
        &self,
        endpoint: Endpoint,
        identifier: &ContentIdentifier,
        session: &TokenHash,
    ) -> std::result::Result<(), SubscribeError> {
        let url = self
            .base_url
            .join(endpoint.path())
            .map_err(|err| SubscribeError::InvalidRequestFormat(err.to_string()))?;

        let body = SubscriptionRequest {
            subscriber_id: session,
            content_id: identifier,
            client_context: ClientContext {
                language: &self.language,
                ip_address: &self.ip_address,
            },
        };

        let response = self
            .http
            .post(url)
            .header("Media-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                warn!(content_id = %identifier, ?endpoint, error = %err, "Request failed");
                SubscribeError::OnSubscribe
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(content_id = %identifier, ?endpoint, status = %status, "Request rejected");
            return Err(SubscribeError::OnSubscribe);
        }

        debug!(content_id = %identifier, ?endpoint, status = %status, "Request accepted");
        Ok(())
    }
}

fn normalize_base(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl SubscriptionApi for RestSubscriptionApi {
    async fn subscribe(
        &self,
        identifier: &ContentIdentifier,
        session: &TokenHash,
    ) -> std::result::Result<(), SubscribeError> {
        self.post(Endpoint::Subscribe, identifier, session).await
    }

    async fn unsubscribe(&self, identifier: &ContentIdentifier, session: &TokenHash) {
        if self
            .post(Endpoint::Unsubscribe, identifier, session)
            .await
            .is_err()
        {
            warn!(content_id = %identifier, "Unsubscribe failed, ignoring");
        }
    }
}
