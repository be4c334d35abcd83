//! Named, observable credentials.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::{TokenHash, TokenName};
use crate::port::outbound::TokenRefresher;

/// Holds one observable value per [`TokenName`].
///
/// Receivers obtained from [`TokenRegistry::token`] stay live for the whole
/// lifetime of the registry and see every save and clear.
#[derive(Default)]
pub struct TokenRegistry {
    channels: RwLock<HashMap<TokenName, watch::Sender<Option<String>>>>,
    refreshers: RwLock<HashMap<TokenName, Arc<dyn TokenRefresher>>>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a token. The channel is created empty on first access.
    pub fn token(&self, name: TokenName) -> watch::Receiver<Option<String>> {
        if let Some(sender) = self.channels.read().get(&name) {
            return sender.subscribe();
        }
        self.channels
            .write()
            .entry(name)
            .or_insert_with(|| watch::channel(None).0)
            .subscribe()
    }

    /// Current raw value of a token.
    #[must_use]
    pub fn current(&self, name: TokenName) -> Option<String> {
        self.channels
            .read()
            .get(&name)
            .and_then(|sender| sender.borrow().clone())
    }

    /// Hash of the current value of a token.
    #[must_use]
    pub fn current_hash(&self, name: TokenName) -> Option<TokenHash> {
        self.current(name).map(|raw| TokenHash::of(&raw))
    }

    pub fn save(&self, name: TokenName, value: impl Into<String>) {
        debug!(token = %name, "Token saved");
        self.publish(name, Some(value.into()));
    }

    pub fn clear(&self, name: TokenName) {
        debug!(token = %name, "Token cleared");
        self.publish(name, None);
    }

    pub fn register_refresher(&self, name: TokenName, refresher: Arc<dyn TokenRefresher>) {
        self.refreshers.write().insert(name, refresher);
    }

    /// Clear a token and ask its refresher for a new value.
    ///
    /// Resolves to `None` when no refresher is registered or the refresher
    /// produced nothing. A produced value is saved before returning.
    pub async fn force_refresh(&self, name: TokenName) -> Option<String> {
        self.clear(name);

        let refresher = self.refreshers.read().get(&name).cloned()?;
        let value = refresher.refresh().await;
        match &value {
            Some(token) => {
                info!(token = %name, "Token refreshed");
                self.save(name, token.clone());
            }
            None => info!(token = %name, "Token refresh produced no value"),
        }
        value
    }

    fn publish(&self, name: TokenName, value: Option<String>) {
        if let Some(sender) = self.channels.read().get(&name) {
            sender.send_replace(value);
            return;
        }
        self.channels
            .write()
            .entry(name)
            .or_insert_with(|| watch::channel(None).0)
            .send_replace(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedRefresher(Option<&'static str>);

    #[async_trait]
    impl TokenRefresher for FixedRefresher {
        async fn refresh(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn token_starts_empty() {
        let registry = TokenRegistry::new();
        assert_eq!(*registry.token(TokenName::Launch).borrow(), None);
        assert_eq!(registry.current(TokenName::Launch), None);
    }

    #[test]
    fn save_and_clear_reach_existing_observers() {
        let registry = TokenRegistry::new();
        let receiver = registry.token(TokenName::SocketSession);

        registry.save(TokenName::SocketSession, "t1");
        assert_eq!(receiver.borrow().as_deref(), Some("t1"));
        assert_eq!(
            registry.current_hash(TokenName::SocketSession),
            Some(TokenHash::of("t1"))
        );

        registry.clear(TokenName::SocketSession);
        assert_eq!(*receiver.borrow(), None);
    }

    #[test]
    fn tokens_are_independent() {
        let registry = TokenRegistry::new();
        registry.save(TokenName::RestSession, "rest");
        assert_eq!(registry.current(TokenName::SocketSession), None);
        assert_eq!(registry.current(TokenName::RestSession).as_deref(), Some("rest"));
    }

    #[tokio::test]
    async fn force_refresh_without_refresher_clears() {
        let registry = TokenRegistry::new();
        registry.save(TokenName::Launch, "old");

        assert_eq!(registry.force_refresh(TokenName::Launch).await, None);
        assert_eq!(registry.current(TokenName::Launch), None);
    }

    #[tokio::test]
    async fn force_refresh_delegates_and_saves() {
        let registry = TokenRegistry::new();
        registry.save(TokenName::Launch, "old");
        registry.register_refresher(TokenName::Launch, Arc::new(FixedRefresher(Some("new"))));
        let mut receiver = registry.token(TokenName::Launch);
        receiver.borrow_and_update();

        assert_eq!(
            registry.force_refresh(TokenName::Launch).await.as_deref(),
            Some("new")
        );
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow().as_deref(), Some("new"));
    }
}
