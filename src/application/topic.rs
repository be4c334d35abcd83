//! Subscription lifecycle shared by paginators and coordinators.
//!
//! ```text
//! Uninitialized -> Requesting -> Active -> Inactive
//!                      |
//!                      +-> Failed
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::registrar::TopicRegistrar;
use super::stream::{ContentFeed, ContentStream, FeedSignal, SubscribableContent};
use super::subscription::{Subscription, WeakSubscription};
use crate::domain::{ContentIdentifier, ContentUpdate, TokenHash};
use crate::error::SubscribeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicPhase {
    Uninitialized,
    Requesting,
    Active,
    Failed,
    Inactive,
}

/// Uniform view of every registered paginator and coordinator.
#[async_trait]
pub trait SubscribedTopic: Send + Sync {
    fn content_identifier(&self) -> &ContentIdentifier;

    fn is_active(&self) -> bool;

    /// Re-register under a new session, keeping local content.
    /// Returns `false` and deactivates the topic when registration fails.
    async fn reconnect(&self, session: &TokenHash) -> bool;

    fn mark_disconnected(&self);

    /// Apply an update if it concerns this topic. Returns whether it did.
    fn handle_update(&self, update: &ContentUpdate) -> bool;
}

pub(crate) struct Topic<T> {
    identifier: ContentIdentifier,
    registrar: TopicRegistrar,
    session: Mutex<TokenHash>,
    phase: Mutex<TopicPhase>,
    initial: OnceCell<Result<(), SubscribeError>>,
    subscription: Mutex<WeakSubscription>,
    /// Strong handle kept between a successful subscribe and the first
    /// caller picking it up.
    handoff: Mutex<Option<Subscription>>,
    feed: ContentFeed<T>,
}

impl<T: Clone + Send + Sync + 'static> Topic<T> {
    pub(crate) fn new(
        identifier: ContentIdentifier,
        session: TokenHash,
        registrar: TopicRegistrar,
    ) -> Self {
        Self {
            identifier,
            registrar,
            session: Mutex::new(session),
            phase: Mutex::new(TopicPhase::Uninitialized),
            initial: OnceCell::new(),
            subscription: Mutex::new(WeakSubscription::default()),
            handoff: Mutex::new(None),
            feed: ContentFeed::new(),
        }
    }

    pub(crate) fn identifier(&self) -> &ContentIdentifier {
        &self.identifier
    }

    pub(crate) fn phase(&self) -> TopicPhase {
        *self.phase.lock()
    }

    pub(crate) fn session(&self) -> TokenHash {
        self.session.lock().clone()
    }

    pub(crate) fn subscription(&self) -> Option<Subscription> {
        if let Some(subscription) = self.subscription.lock().upgrade() {
            return Some(subscription);
        }
        self.handoff.lock().clone()
    }

    pub(crate) fn is_active(&self) -> bool {
        match self.phase() {
            TopicPhase::Uninitialized | TopicPhase::Requesting => true,
            TopicPhase::Active => {
                self.subscription.lock().is_alive() || self.handoff.lock().is_some()
            }
            TopicPhase::Failed | TopicPhase::Inactive => false,
        }
    }

    /// Subscribe on first call, then open a content stream.
    ///
    /// Concurrent first callers share one REST subscribe. The caller that
    /// picks up the fresh handle sees `Disconnected, Connected`; later
    /// callers see `Connected` followed by the latest content.
    pub(crate) async fn attach(&self) -> Result<ContentStream<T>, SubscribeError> {
        self.initial
            .get_or_init(|| self.request_initial())
            .await
            .clone()?;

        let weak = self.subscription.lock().clone();
        let handoff = self.handoff.lock().take();
        if let Some(subscription) = handoff {
            let prelude = VecDeque::from([
                SubscribableContent::Disconnected,
                SubscribableContent::Connected(subscription),
            ]);
            return Ok(self.feed.open(prelude, true, weak));
        }

        match weak.upgrade() {
            Some(subscription) => Ok(self.feed.open(
                VecDeque::from([SubscribableContent::Connected(subscription)]),
                true,
                weak,
            )),
            None => Err(SubscribeError::SubscriptionNotFound),
        }
    }

    async fn request_initial(&self) -> Result<(), SubscribeError> {
        *self.phase.lock() = TopicPhase::Requesting;
        let session = self.session();

        match self.registrar.subscribe(&self.identifier, &session).await {
            Ok(subscription) => {
                let mut phase = self.phase.lock();
                if *phase != TopicPhase::Requesting {
                    debug!(content_id = %self.identifier, phase = ?*phase, "Topic closed while subscribing");
                    return Err(SubscribeError::SubscriptionNotFound);
                }
                *self.subscription.lock() = subscription.downgrade();
                *self.handoff.lock() = Some(subscription);
                *phase = TopicPhase::Active;
                info!(content_id = %self.identifier, "Topic active");
                Ok(())
            }
            Err(err) => {
                let mut phase = self.phase.lock();
                if *phase == TopicPhase::Requesting {
                    *phase = TopicPhase::Failed;
                }
                Err(err)
            }
        }
    }

    /// Register an extra identifier (a further page) under this topic's handle.
    pub(crate) async fn associate(
        &self,
        identifier: ContentIdentifier,
    ) -> Result<(), SubscribeError> {
        let subscription = self.subscription().ok_or(SubscribeError::SubscriptionNotFound)?;
        self.registrar
            .register(&identifier, &subscription.session())
            .await?;
        subscription.associate(identifier);
        Ok(())
    }

    /// Re-register every identifier of this topic under `session`.
    ///
    /// A topic still waiting on its first subscribe is replayed once that
    /// subscribe resolves. The handle only moves to `session` when every
    /// identifier registered; on failure the ones already registered are
    /// released again and the topic is deactivated.
    pub(crate) async fn reconnect(&self, session: &TokenHash) -> bool {
        if self
            .initial
            .get_or_init(|| self.request_initial())
            .await
            .is_err()
        {
            self.deactivate();
            return false;
        }

        let Some(subscription) = self.subscription() else {
            self.deactivate();
            return false;
        };

        let identifiers = subscription.identifiers();
        for (index, identifier) in identifiers.iter().enumerate() {
            if self.registrar.register(identifier, session).await.is_err() {
                warn!(content_id = %self.identifier, "Reconnect failed, topic deactivated");
                self.deactivate();
                for registered in &identifiers[..index] {
                    self.registrar.unsubscribe(registered, session).await;
                }
                return false;
            }
        }

        *self.session.lock() = session.clone();
        subscription.rebind(session.clone());
        debug!(content_id = %self.identifier, "Topic reconnected");
        self.feed.signal(FeedSignal::Connected);
        true
    }

    pub(crate) fn deactivate(&self) {
        *self.phase.lock() = TopicPhase::Inactive;
    }

    pub(crate) fn mark_disconnected(&self) {
        self.feed.signal(FeedSignal::Disconnected);
    }

    pub(crate) fn publish(&self, content: T) {
        self.feed.publish(content);
    }

    pub(crate) fn latest(&self) -> Option<T> {
        self.feed.latest()
    }
}
