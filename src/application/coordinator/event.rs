//! Single-event topic.

use async_trait::async_trait;
use tracing::debug;

use crate::application::registrar::TopicRegistrar;
use crate::application::storage::EventsStorage;
use crate::application::stream::{ContentStream, EntityUpdates};
use crate::application::topic::{SubscribedTopic, Topic};
use crate::domain::{
    ContentChange, ContentIdentifier, ContentRoute, ContentType, ContentUpdate, Event, EventId,
    EventLiveData, Market, MarketId, Outcome, OutcomeId, TokenHash,
};
use crate::error::SubscribeError;

/// Tracks one event in detail, including live data published for it.
pub struct EventDetailsCoordinator {
    event_id: EventId,
    topic: Topic<Event>,
    storage: EventsStorage,
}

impl EventDetailsCoordinator {
    pub(crate) fn new(event_id: EventId, session: TokenHash, registrar: TopicRegistrar) -> Self {
        let identifier = ContentIdentifier::new(ContentRoute::EventDetails {
            event_id: event_id.clone(),
        });
        Self {
            event_id,
            topic: Topic::new(identifier, session, registrar),
            storage: EventsStorage::new(),
        }
    }

    pub(crate) async fn attach(&self) -> Result<ContentStream<Event>, SubscribeError> {
        self.topic.attach().await
    }

    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    #[must_use]
    pub fn event(&self) -> Option<Event> {
        self.storage.event(&self.event_id)
    }

    pub fn update_event_details(&self, event: Event) {
        if event.id != self.event_id {
            debug!(expected = %self.event_id, received = %event.id, "Ignoring foreign event details");
            return;
        }
        self.storage.replace_events(vec![event]);
        self.publish();
    }

    pub fn updated_live_data(&self, live_data: &EventLiveData) {
        if self.storage.update_live_data(&self.event_id, live_data) {
            self.publish();
        }
    }

    fn publish(&self) {
        if let Some(event) = self.event() {
            self.topic.publish(event);
        }
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

    /// Live data of the tracked event. Available before the first snapshot.
    pub fn subscribe_to_event_live_data_updates(
        &self,
        id: &EventId,
    ) -> Option<EntityUpdates<EventLiveData>> {
        (id == &self.event_id).then(|| {
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

    fn is_live_data_for_event(&self, identifier: &ContentIdentifier) -> bool {
        matches!(
            identifier.content_route(),
            ContentRoute::EventLiveData { event_id } if *event_id == self.event_id
        )
    }
}

#[async_trait]
impl SubscribedTopic for EventDetailsCoordinator {
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
        match &update.change {
            ContentChange::EventDetails(event) if update.identifier == *self.topic.identifier() => {
                match event {
                    Some(event) => self.update_event_details(event.clone()),
                    None => debug!(event_id = %self.event_id, "Event details empty"),
                }
                true
            }
            ContentChange::LiveData(live_data)
                if update.content_type() == ContentType::EventLiveData
                    && self.is_live_data_for_event(&update.identifier) =>
            {
                if let Some(live_data) = live_data {
                    self.updated_live_data(live_data);
                }
                true
            }
            change if change.is_incremental() && self.storage.concerns(change) => {
                if self.storage.apply(change) {
                    self.publish();
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::registrar::RegistrarSettings;
    use crate::testkit::api::RecordingApi;
    use crate::testkit::domain::event_with_market;

    fn coordinator(api: &Arc<RecordingApi>) -> EventDetailsCoordinator {
        EventDetailsCoordinator::new(
            EventId::new("e1"),
            TokenHash::of("t1"),
            TopicRegistrar::new(api.clone(), RegistrarSettings::default()),
        )
    }

    #[tokio::test]
    async fn applies_details_and_live_data() {
        let api = Arc::new(RecordingApi::new());
        let coordinator = coordinator(&api);
        let mut live = coordinator
            .subscribe_to_event_live_data_updates(&EventId::new("e1"))
            .unwrap();

        let details = ContentUpdate::new(
            coordinator.content_identifier().clone(),
            ContentChange::EventDetails(Some(event_with_market("e1", "m1", "o1"))),
        );
        assert!(coordinator.handle_update(&details));
        assert!(coordinator.contains_outcome(&OutcomeId::new("o1")));

        let live_update = ContentUpdate::new(
            ContentIdentifier::new(ContentRoute::EventLiveData {
                event_id: EventId::new("e1"),
            }),
            ContentChange::LiveData(Some(EventLiveData {
                home_score: Some(1),
                ..EventLiveData::default()
            })),
        );
        assert!(coordinator.handle_update(&live_update));
        let current = live.changed().await.unwrap();
        assert_eq!(current.and_then(|data| data.home_score), Some(1));
    }

    #[test]
    fn ignores_other_events() {
        let api = Arc::new(RecordingApi::new());
        let coordinator = coordinator(&api);
        let other = ContentUpdate::new(
            ContentIdentifier::new(ContentRoute::EventDetails {
                event_id: EventId::new("e2"),
            }),
            ContentChange::EventDetails(Some(event_with_market("e2", "m2", "o2"))),
        );
        assert!(!coordinator.handle_update(&other));
        assert!(coordinator.event().is_none());
    }
}
