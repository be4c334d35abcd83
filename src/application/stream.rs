//! Observable content streams handed to callers.

use std::collections::VecDeque;
use std::fmt;

use futures_util::stream::{self, Stream};
use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};
use tracing::warn;

use super::subscription::{Subscription, WeakSubscription};

const FEED_CAPACITY: usize = 64;

/// Envelope of every emission on a content stream.
///
/// `Connected` carries the handle that keeps the topic alive; callers must
/// hold it for as long as they want updates.
#[derive(Clone)]
pub enum SubscribableContent<T> {
    Disconnected,
    Connected(Subscription),
    ContentUpdate(T),
}

impl<T> SubscribableContent<T> {
    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        match self {
            Self::Connected(subscription) => Some(subscription),
            _ => None,
        }
    }

    #[must_use]
    pub fn content(&self) -> Option<&T> {
        match self {
            Self::ContentUpdate(content) => Some(content),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Self::ContentUpdate(content) => Some(content),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SubscribableContent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("Disconnected"),
            Self::Connected(subscription) => f.debug_tuple("Connected").field(subscription).finish(),
            Self::ContentUpdate(content) => f.debug_tuple("ContentUpdate").field(content).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum FeedSignal<T> {
    Connected,
    Disconnected,
    Content(T),
}

/// Broadcast side of a topic's content stream. Keeps the latest snapshot so
/// late subscribers start from current content.
pub(crate) struct ContentFeed<T> {
    tx: broadcast::Sender<FeedSignal<T>>,
    latest: RwLock<Option<T>>,
}

impl<T: Clone + Send + Sync + 'static> ContentFeed<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            tx,
            latest: RwLock::new(None),
        }
    }

    pub(crate) fn publish(&self, content: T) {
        let mut latest = self.latest.write();
        *latest = Some(content.clone());
        let _ = self.tx.send(FeedSignal::Content(content));
    }

    pub(crate) fn signal(&self, signal: FeedSignal<T>) {
        let _latest = self.latest.read();
        let _ = self.tx.send(signal);
    }

    pub(crate) fn latest(&self) -> Option<T> {
        self.latest.read().clone()
    }

    /// Open a stream that first yields `prelude`, then the latest snapshot
    /// when `replay_latest` is set, then live signals.
    pub(crate) fn open(
        &self,
        mut prelude: VecDeque<SubscribableContent<T>>,
        replay_latest: bool,
        subscription: WeakSubscription,
    ) -> ContentStream<T> {
        let latest = self.latest.read();
        if replay_latest {
            if let Some(content) = latest.clone() {
                prelude.push_back(SubscribableContent::ContentUpdate(content));
            }
        }
        ContentStream {
            prelude,
            receiver: self.tx.subscribe(),
            subscription,
        }
    }
}

/// Live stream of one topic's content.
///
/// Not single-shot: it keeps yielding as socket updates arrive and ends only
/// when the topic itself is dropped.
pub struct ContentStream<T> {
    prelude: VecDeque<SubscribableContent<T>>,
    receiver: broadcast::Receiver<FeedSignal<T>>,
    subscription: WeakSubscription,
}

impl<T: Clone + Send + 'static> ContentStream<T> {
    /// Wait for the next emission. `None` once the topic is gone.
    pub async fn next(&mut self) -> Option<SubscribableContent<T>> {
        if let Some(item) = self.prelude.pop_front() {
            return Some(item);
        }
        loop {
            match self.receiver.recv().await {
                Ok(signal) => {
                    if let Some(item) = self.convert(signal) {
                        return Some(item);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Content stream lagging, skipped emissions");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next emission if one is already available.
    pub fn try_next(&mut self) -> Option<SubscribableContent<T>> {
        if let Some(item) = self.prelude.pop_front() {
            return Some(item);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => {
                    if let Some(item) = self.convert(signal) {
                        return Some(item);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Content stream lagging, skipped emissions");
                }
                Err(_) => return None,
            }
        }
    }

    /// Handle of the topic, if some caller still holds one.
    #[must_use]
    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription.upgrade()
    }

    pub fn into_stream(self) -> impl Stream<Item = SubscribableContent<T>> {
        stream::unfold(self, |mut content| async move {
            content.next().await.map(|item| (item, content))
        })
    }

    fn convert(&self, signal: FeedSignal<T>) -> Option<SubscribableContent<T>> {
        match signal {
            FeedSignal::Content(content) => Some(SubscribableContent::ContentUpdate(content)),
            FeedSignal::Disconnected => Some(SubscribableContent::Disconnected),
            FeedSignal::Connected => self
                .subscription
                .upgrade()
                .map(SubscribableContent::Connected),
        }
    }
}

/// Updates of one entity inside a subscribed topic.
///
/// Holds the topic's handle, so the topic stays subscribed while any
/// `EntityUpdates` for it is alive. Yields only when the entity changes.
pub struct EntityUpdates<T> {
    receiver: watch::Receiver<Option<T>>,
    subscription: Option<Subscription>,
}

impl<T: Clone> EntityUpdates<T> {
    pub(crate) fn new(receiver: watch::Receiver<Option<T>>, subscription: Option<Subscription>) -> Self {
        Self {
            receiver,
            subscription,
        }
    }

    /// Current value; `None` once the entity was removed.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the entity to change. Returns `Err` when the owning topic
    /// has been dropped.
    pub async fn changed(&mut self) -> Result<Option<T>, watch::error::RecvError> {
        self.receiver.changed().await?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Whether a change is waiting to be observed.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_subscriber_replays_latest() {
        let feed = ContentFeed::<u32>::new();
        feed.publish(1);
        feed.publish(2);

        let mut stream = feed.open(VecDeque::new(), true, WeakSubscription::default());
        assert_eq!(stream.next().await.and_then(|item| item.into_content()), Some(2));
        assert!(stream.try_next().is_none());

        feed.publish(3);
        assert_eq!(stream.next().await.and_then(|item| item.into_content()), Some(3));
    }

    #[tokio::test]
    async fn connected_without_live_handle_is_skipped() {
        let feed = ContentFeed::<u32>::new();
        let mut stream = feed.open(VecDeque::new(), false, WeakSubscription::default());

        feed.signal(FeedSignal::Connected);
        feed.signal(FeedSignal::Disconnected);

        assert!(matches!(stream.next().await, Some(SubscribableContent::Disconnected)));
    }

    #[tokio::test]
    async fn stream_ends_with_feed() {
        let feed = ContentFeed::<u32>::new();
        let mut stream = feed.open(VecDeque::new(), false, WeakSubscription::default());
        drop(feed);
        assert!(stream.next().await.is_none());
    }
}
