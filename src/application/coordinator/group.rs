//! Competition, outright and summary topics: one group of events each.

use async_trait::async_trait;

use crate::application::registrar::TopicRegistrar;
use crate::application::storage::EventsStorage;
use crate::application::stream::{ContentStream, EntityUpdates};
use crate::application::topic::{SubscribedTopic, Topic};
use crate::domain::{
    ContentChange, ContentIdentifier, ContentRoute, ContentUpdate, Event, EventId,
    EventLiveData, EventsGroup, Market, MarketGroupId, MarketId, Outcome, OutcomeId, TokenHash,
};
use crate::error::SubscribeError;

pub struct EventGroupCoordinator {
    market_group_id: Option<MarketGroupId>,
    topic: Topic<Vec<EventsGroup>>,
    storage: EventsStorage,
}

impl EventGroupCoordinator {
    pub(crate) fn new(
        identifier: ContentIdentifier,
        session: TokenHash,
        registrar: TopicRegistrar,
    ) -> Self {
        let market_group_id = match identifier.content_route() {
            ContentRoute::EventGroup { market_group_id }
            | ContentRoute::OutrightEventGroup { market_group_id } => Some(market_group_id.clone()),
            _ => None,
        };
        Self {
            market_group_id,
            topic: Topic::new(identifier, session, registrar),
            storage: EventsStorage::new(),
        }
    }

    pub(crate) async fn attach(&self) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.topic.attach().await
    }

    /// Replace the group's events and re-emit.
    pub fn update_events(&self, events: Vec<Event>) {
        self.storage.replace_events(events);
        self.publish();
    }

    fn publish(&self) {
        self.topic.publish(vec![EventsGroup::new(
            self.storage.events(),
            self.market_group_id.clone(),
        )]);
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
impl SubscribedTopic for EventGroupCoordinator {
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
        let own_topic = update.identifier.pageable_id() == self.topic.identifier().pageable_id();
        match &update.change {
            ContentChange::Events(events) if own_topic => {
                self.update_events(events.clone());
                true
            }
            change if change.is_incremental() && (own_topic || self.storage.concerns(change)) => {
                if self.storage.apply(change) {
                    self.publish();
                }
                true
            }
            _ => false,
        }
    }
}
