//! Forced refresh of named credentials.

use async_trait::async_trait;

/// Strategy that obtains a fresh value for one named token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Fetch a new raw token, or `None` when none can be obtained.
    async fn refresh(&self) -> Option<String>;
}
