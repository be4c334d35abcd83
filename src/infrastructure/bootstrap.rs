//! Composition root: builds the engine from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::rest::RestSubscriptionApi;
use crate::application::{SubscriptionOrchestrator, TokenRegistry, TopicRegistrar};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::SubscriptionApi;

/// Build the REST subscription adapter.
#[allow(clippy::result_large_err)]
pub fn build_subscription_api(config: &Config) -> Result<Arc<dyn SubscriptionApi>> {
    let api = RestSubscriptionApi::from_config(&config.service)?;
    info!(api_url = %config.service.api_url, "Subscription API ready");
    Ok(Arc::new(api))
}

/// Build an orchestrator over an existing API and token registry.
#[must_use]
pub fn build_orchestrator_with(
    config: &Config,
    api: Arc<dyn SubscriptionApi>,
    tokens: Arc<TokenRegistry>,
) -> Arc<SubscriptionOrchestrator> {
    let registrar = TopicRegistrar::new(api, config.service.registrar_settings());
    Arc::new(SubscriptionOrchestrator::new(
        registrar,
        tokens,
        config.service.provider_settings(),
    ))
}

/// Build an orchestrator backed by the REST adapter and a fresh token registry.
#[allow(clippy::result_large_err)]
pub fn build_orchestrator(config: &Config) -> Result<Arc<SubscriptionOrchestrator>> {
    let api = build_subscription_api(config)?;
    Ok(build_orchestrator_with(config, api, Arc::new(TokenRegistry::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TokenName;
    use crate::testkit::api::RecordingApi;

    fn config() -> Config {
        Config::parse_toml("[service]\napi_url = \"http://127.0.0.1:1/\"\n").unwrap()
    }

    #[tokio::test]
    async fn build_orchestrator_from_config() {
        let orchestrator = build_orchestrator(&config()).unwrap();
        assert!(orchestrator.active_topics().is_empty());
        assert!(orchestrator.tokens().current(TokenName::SocketSession).is_none());
    }

    #[test]
    fn build_orchestrator_with_shares_registry() {
        let tokens = Arc::new(TokenRegistry::new());
        let orchestrator =
            build_orchestrator_with(&config(), Arc::new(RecordingApi::new()), Arc::clone(&tokens));
        tokens.save(TokenName::SocketSession, "t1");
        assert_eq!(
            orchestrator.tokens().current(TokenName::SocketSession).as_deref(),
            Some("t1")
        );
    }
}
