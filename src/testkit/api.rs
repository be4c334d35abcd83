//! Recording subscription API.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ContentIdentifier, TokenHash};
use crate::error::SubscribeError;
use crate::port::outbound::SubscriptionApi;

/// One recorded REST call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub identifier: ContentIdentifier,
    pub session: TokenHash,
}

/// In-memory [`SubscriptionApi`] that records every call.
///
/// Subscribes succeed unless `fail_next` budget remains or the identifier was
/// marked with `fail_identifier`. Failed attempts are recorded too.
#[derive(Debug, Default)]
pub struct RecordingApi {
    subscribes: Mutex<Vec<ApiCall>>,
    unsubscribes: Mutex<Vec<ApiCall>>,
    fail_budget: AtomicUsize,
    failing: Mutex<HashSet<String>>,
    latency: Mutex<Option<Duration>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subscribe call sleeps for `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        let api = Self::default();
        *api.latency.lock() = Some(latency);
        api
    }

    /// Fail the next `count` subscribe calls, whatever their identifier.
    pub fn fail_next(&self, count: usize) {
        self.fail_budget.store(count, Ordering::SeqCst);
    }

    /// Fail every subscribe of `identifier` until [`RecordingApi::heal`].
    pub fn fail_identifier(&self, identifier: &ContentIdentifier) {
        self.failing.lock().insert(identifier.key());
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
        self.fail_budget.store(0, Ordering::SeqCst);
    }

    pub fn subscribe_calls(&self) -> Vec<ApiCall> {
        self.subscribes.lock().clone()
    }

    pub fn unsubscribe_calls(&self) -> Vec<ApiCall> {
        self.unsubscribes.lock().clone()
    }

    /// Subscribe calls made under `session`.
    pub fn subscribes_for(&self, session: &TokenHash) -> Vec<ContentIdentifier> {
        self.subscribes
            .lock()
            .iter()
            .filter(|call| &call.session == session)
            .map(|call| call.identifier.clone())
            .collect()
    }

    pub fn reset_calls(&self) {
        self.subscribes.lock().clear();
        self.unsubscribes.lock().clear();
    }

    /// Let background unsubscribe tasks spawned by dropped handles finish.
    pub async fn settle(&self) {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    fn take_failure(&self, identifier: &ContentIdentifier) -> bool {
        if self.failing.lock().contains(&identifier.key()) {
            return true;
        }
        self.fail_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SubscriptionApi for RecordingApi {
    async fn subscribe(
        &self,
        identifier: &ContentIdentifier,
        session: &TokenHash,
    ) -> Result<(), SubscribeError> {
        self.subscribes.lock().push(ApiCall {
            identifier: identifier.clone(),
            session: session.clone(),
        });
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.take_failure(identifier) {
            return Err(SubscribeError::OnSubscribe);
        }
        Ok(())
    }

    async fn unsubscribe(&self, identifier: &ContentIdentifier, session: &TokenHash) {
        self.unsubscribes.lock().push(ApiCall {
            identifier: identifier.clone(),
            session: session.clone(),
        });
    }
}
