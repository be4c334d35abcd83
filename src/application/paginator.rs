//! Paged event-list topics (pre-live and live lists).

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::registrar::TopicRegistrar;
use super::storage::EventsStorage;
use super::stream::{ContentStream, EntityUpdates};
use super::topic::{SubscribedTopic, Topic, TopicPhase};
use crate::domain::{
    ContentChange, ContentIdentifier, ContentUpdate, Event, EventId, EventLiveData, EventsGroup,
    Market, MarketId, Outcome, OutcomeId, TokenHash,
};
use crate::error::SubscribeError;

#[derive(Debug, Clone, Copy)]
struct PagingState {
    current_page: u32,
    page_size: u32,
    has_next_page: bool,
}

/// Owns every page of one event list.
///
/// All pages share one pageable id and one [`Subscription`](super::Subscription):
/// further pages are registered as identifiers associated with it.
pub struct ListPaginator {
    topic: Topic<Vec<EventsGroup>>,
    storage: EventsStorage,
    paging: Mutex<PagingState>,
}

impl ListPaginator {
    pub(crate) fn new(
        identifier: ContentIdentifier,
        session: TokenHash,
        registrar: TopicRegistrar,
        default_page_size: u32,
    ) -> Self {
        let route = identifier.content_route();
        let current_page = route.page_index().unwrap_or(0);
        let page_size = route.page_size().unwrap_or(default_page_size).max(1);

        Self {
            topic: Topic::new(identifier, session, registrar),
            storage: EventsStorage::new(),
            paging: Mutex::new(PagingState {
                current_page,
                page_size,
                has_next_page: false,
            }),
        }
    }

    /// Subscribe the first page, or join the existing subscription.
    pub async fn request_initial_page(
        &self,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.topic.attach().await
    }

    /// Register the next page. Resolves to `false` when the last list update
    /// indicated there is nothing more to fetch.
    pub async fn request_next_page(&self) -> Result<bool, SubscribeError> {
        if self.topic.phase() != TopicPhase::Active || !self.topic.is_active() {
            return Err(SubscribeError::SubscriptionNotFound);
        }

        let next_page = {
            let mut paging = self.paging.lock();
            if !paging.has_next_page {
                debug!(content_id = %self.topic.identifier(), "No further pages");
                return Ok(false);
            }
            paging.current_page += 1;
            paging.current_page
        };

        let Some(identifier) = self.topic.identifier().with_page(next_page) else {
            self.rollback_page(next_page);
            return Ok(false);
        };

        match self.topic.associate(identifier).await {
            Ok(()) => {
                info!(content_id = %self.topic.identifier(), page = next_page, "Next page requested");
                Ok(true)
            }
            Err(err) => {
                self.rollback_page(next_page);
                Err(err)
            }
        }
    }

    fn rollback_page(&self, page: u32) {
        let mut paging = self.paging.lock();
        if paging.current_page == page {
            paging.current_page = page.saturating_sub(1);
        }
    }

    /// Merge a received list into storage and re-emit the whole snapshot.
    pub fn update_events_list(&self, events: Vec<Event>) {
        {
            let mut paging = self.paging.lock();
            paging.has_next_page = events.len() >= paging.page_size as usize;
        }
        self.storage.merge_events(events);
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        self.topic
            .publish(vec![EventsGroup::new(self.storage.events(), None)]);
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.paging.lock().current_page
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.paging.lock().has_next_page
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.storage.events()
    }

    #[must_use]
    pub fn contains_event(&self, id: &EventId) -> bool {
        self.storage.contains_event(id)
    }

    #[must_use]
    pub fn contains_market(&self, id: &MarketId) -> bool {
        self.storage.contains_market(id)
    }

    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.storage.contains_outcome(id)
    }

    /// Live data of one listed event. `None` when the event is not listed.
    pub fn subscribe_to_event_live_data_updates(
        &self,
        id: &EventId,
    ) -> Option<EntityUpdates<EventLiveData>> {
        self.contains_event(id).then(|| {
            EntityUpdates::new(
                self.storage.watch_live_data(id.clone()),
                self.topic.subscription(),
            )
        })
    }

    pub fn subscribe_to_event_market_updates(
        &self,
        id: &MarketId,
    ) -> Option<EntityUpdates<Market>> {
        self.contains_market(id).then(|| {
            EntityUpdates::new(
                self.storage.watch_market(id.clone()),
                self.topic.subscription(),
            )
        })
    }

    pub fn subscribe_to_event_outcome_updates(
        &self,
        id: &OutcomeId,
    ) -> Option<EntityUpdates<Outcome>> {
        self.contains_outcome(id).then(|| {
            EntityUpdates::new(
                self.storage.watch_outcome(id.clone()),
                self.topic.subscription(),
            )
        })
    }
}

#[async_trait]
impl SubscribedTopic for ListPaginator {
    fn content_identifier(&self) -> &ContentIdentifier {
        self.topic.identifier()
    }

    fn is_active(&self) -> bool {
        self.topic.is_active()
    }

    async fn reconnect(&self, session: &TokenHash) -> bool {
        self.topic.reconnect(session).await
    }

    fn mark_disconnected(&self) {
        self.topic.mark_disconnected();
    }

    fn handle_update(&self, update: &ContentUpdate) -> bool {
        if update.identifier.pageable_id() != self.topic.identifier().pageable_id() {
            return false;
        }
        match &update.change {
            ContentChange::Events(events) => {
                self.update_events_list(events.clone());
                true
            }
            change if change.is_incremental() => {
                if self.storage.apply(change) {
                    self.publish_snapshot();
                }
                true
            }
            _ => false,
        }
    }
}
