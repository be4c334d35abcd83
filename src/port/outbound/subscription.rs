//! REST topic registration port.

use async_trait::async_trait;

use crate::domain::{ContentIdentifier, TokenHash};
use crate::error::SubscribeError;

/// Registers and releases topics with the backend.
///
/// A successful `subscribe` tells the backend to push updates for the topic
/// to the socket session identified by `session`.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Register a topic. Succeeds only on a 2xx response.
    async fn subscribe(
        &self,
        identifier: &ContentIdentifier,
        session: &TokenHash,
    ) -> Result<(), SubscribeError>;

    /// Release a topic. Implementations log failures; callers never see them.
    async fn unsubscribe(&self, identifier: &ContentIdentifier, session: &TokenHash);
}
