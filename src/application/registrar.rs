//! Topic registration on top of the REST subscription port.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::subscription::Subscription;
use crate::domain::{ContentIdentifier, TokenHash};
use crate::error::SubscribeError;
use crate::port::outbound::SubscriptionApi;

/// Retry policy for initial subscribes.
#[derive(Debug, Clone, Copy)]
pub struct RegistrarSettings {
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for RegistrarSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 0,
        }
    }
}

/// Turns content identifiers into REST subscribe and unsubscribe calls.
#[derive(Clone)]
pub struct TopicRegistrar {
    api: Arc<dyn SubscriptionApi>,
    settings: RegistrarSettings,
}

impl TopicRegistrar {
    pub fn new(api: Arc<dyn SubscriptionApi>, settings: RegistrarSettings) -> Self {
        Self { api, settings }
    }

    /// Subscribe to a topic and hand back its owning handle.
    ///
    /// Retried up to the configured number of attempts; the last error is
    /// returned when every attempt fails.
    pub async fn subscribe(
        &self,
        identifier: &ContentIdentifier,
        session: &TokenHash,
    ) -> Result<Subscription, SubscribeError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.api.subscribe(identifier, session).await {
                Ok(()) => {
                    debug!(content_id = %identifier, attempt, "Subscribed to topic");
                    return Ok(Subscription::new(
                        identifier.clone(),
                        session.clone(),
                        self.clone(),
                    ));
                }
                Err(err) if attempt >= max_attempts => {
                    warn!(content_id = %identifier, attempt, error = %err, "Subscribe failed");
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        content_id = %identifier,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Subscribe failed, retrying"
                    );
                    if self.settings.retry_backoff_ms > 0 {
                        sleep(Duration::from_millis(self.settings.retry_backoff_ms)).await;
                    }
                }
            }
        }
    }

    /// Single registration attempt with no handle. Used for extra pages and
    /// reconnection replays, which attach to an existing handle.
    pub async fn register(
        &self,
        identifier: &ContentIdentifier,
        session: &TokenHash,
    ) -> Result<(), SubscribeError> {
        let result = self.api.subscribe(identifier, session).await;
        if let Err(err) = &result {
            warn!(content_id = %identifier, error = %err, "Topic registration failed");
        }
        result
    }

    /// Release a topic. Never fails from the caller's point of view.
    pub async fn unsubscribe(&self, identifier: &ContentIdentifier, session: &TokenHash) {
        self.api.unsubscribe(identifier, session).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentRoute, EventId};
    use crate::testkit::api::RecordingApi;

    fn identifier() -> ContentIdentifier {
        ContentIdentifier::new(ContentRoute::EventDetails {
            event_id: EventId::new("e1"),
        })
    }

    #[tokio::test]
    async fn subscribe_retries_until_success() {
        let api = Arc::new(RecordingApi::new());
        api.fail_next(2);
        let registrar = TopicRegistrar::new(api.clone(), RegistrarSettings::default());

        let subscription = registrar
            .subscribe(&identifier(), &TokenHash::of("t1"))
            .await
            .unwrap();

        assert_eq!(subscription.content_identifier(), &identifier());
        assert_eq!(api.subscribe_calls().len(), 3);
    }

    #[tokio::test]
    async fn subscribe_returns_last_error_when_attempts_run_out() {
        let api = Arc::new(RecordingApi::new());
        api.fail_next(5);
        let registrar = TopicRegistrar::new(
            api.clone(),
            RegistrarSettings {
                max_attempts: 2,
                retry_backoff_ms: 0,
            },
        );

        let result = registrar.subscribe(&identifier(), &TokenHash::of("t1")).await;

        assert!(result.is_err());
        assert_eq!(api.subscribe_calls().len(), 2);
    }

    #[tokio::test]
    async fn register_makes_a_single_attempt() {
        let api = Arc::new(RecordingApi::new());
        api.fail_next(1);
        let registrar = TopicRegistrar::new(api.clone(), RegistrarSettings::default());

        assert!(registrar
            .register(&identifier(), &TokenHash::of("t1"))
            .await
            .is_err());
        assert_eq!(api.subscribe_calls().len(), 1);
    }
}
