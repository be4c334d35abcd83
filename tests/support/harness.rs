use std::sync::Arc;

use sportsync::application::{
    ContentStream, SubscribableContent, SubscriptionOrchestrator, Subscription, TokenRegistry,
};
use sportsync::infrastructure::bootstrap::build_orchestrator_with;
use sportsync::infrastructure::config::Config;
use sportsync::testkit::api::RecordingApi;

pub const FIRST_TOKEN: &str = "session-t1";
pub const SECOND_TOKEN: &str = "session-t2";

pub struct Harness {
    pub api: Arc<RecordingApi>,
    pub tokens: Arc<TokenRegistry>,
    pub orchestrator: Arc<SubscriptionOrchestrator>,
}

pub fn config(page_size: u32) -> Config {
    Config::parse_toml(&format!(
        r#"
[service]
api_url = "http://127.0.0.1:1/"
default_page_size = {page_size}
retry_backoff_ms = 0
"#
    ))
    .unwrap()
}

/// Orchestrator with no session token yet.
pub fn disconnected_with(api: RecordingApi, page_size: u32) -> Harness {
    let api = Arc::new(api);
    let tokens = Arc::new(TokenRegistry::new());
    let orchestrator = build_orchestrator_with(&config(page_size), api.clone(), tokens.clone());
    Harness {
        api,
        tokens,
        orchestrator,
    }
}

pub fn disconnected(page_size: u32) -> Harness {
    disconnected_with(RecordingApi::new(), page_size)
}

/// Orchestrator whose first session token has been reported.
pub async fn connected_with(api: RecordingApi, page_size: u32) -> Harness {
    let harness = disconnected_with(api, page_size);
    assert!(harness
        .orchestrator
        .on_socket_token(Some(FIRST_TOKEN.to_string()))
        .await
        .is_none());
    harness
}

pub async fn connected(page_size: u32) -> Harness {
    connected_with(RecordingApi::new(), page_size).await
}

/// Consume the `Disconnected, Connected` prelude of a first subscriber and
/// return the handle.
pub async fn take_handle<T: Clone + Send + 'static>(stream: &mut ContentStream<T>) -> Subscription {
    assert!(matches!(
        stream.next().await,
        Some(SubscribableContent::Disconnected)
    ));
    match stream.next().await {
        Some(SubscribableContent::Connected(subscription)) => subscription,
        other => panic!("expected connected, got {:?}", other.map(|_| ())),
    }
}

pub async fn next_content<T: Clone + Send + 'static>(stream: &mut ContentStream<T>) -> T {
    match stream.next().await {
        Some(SubscribableContent::ContentUpdate(content)) => content,
        other => panic!("expected content, got {:?}", other.map(|_| ())),
    }
}
