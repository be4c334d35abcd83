//! Inbound update dispatch.

use std::sync::Arc;

use tracing::trace;

use super::SubscriptionOrchestrator;
use crate::application::topic::SubscribedTopic;
use crate::domain::{ContentType, ContentUpdate};
use crate::port::inbound::ContentUpdateHandler;

impl SubscriptionOrchestrator {
    /// Route one update. The owner of the update's pageable id gets it first,
    /// then every coordinator that may track the same entities.
    /// Returns whether any topic applied it.
    pub fn dispatch(&self, update: &ContentUpdate) -> bool {
        let key = update.identifier.pageable_id();

        let (owner, coordinators) = {
            let mut registries = self.registries.lock();
            registries.purge_inactive();

            let owner: Option<Arc<dyn SubscribedTopic>> = match update.content_type() {
                ContentType::PreLiveEvents | ContentType::LiveEvents => registries
                    .paginators
                    .get(&key)
                    .map(|topic| Arc::clone(topic) as Arc<dyn SubscribedTopic>),
                ContentType::EventGroup
                | ContentType::OutrightEventGroup
                | ContentType::EventSummary => registries
                    .groups
                    .get(&key)
                    .map(|topic| Arc::clone(topic) as Arc<dyn SubscribedTopic>),
                ContentType::LiveSports | ContentType::PreLiveSports | ContentType::AllSports => {
                    registries
                        .sports
                        .get(&key)
                        .map(|topic| Arc::clone(topic) as Arc<dyn SubscribedTopic>)
                }
                ContentType::EventDetails | ContentType::EventLiveData | ContentType::Market => {
                    None
                }
            };

            let mut coordinators: Vec<Arc<dyn SubscribedTopic>> = Vec::new();
            coordinators.extend(
                registries
                    .event_details
                    .values()
                    .map(|topic| Arc::clone(topic) as Arc<dyn SubscribedTopic>),
            );
            coordinators.extend(
                registries
                    .markets
                    .values()
                    .map(|topic| Arc::clone(topic) as Arc<dyn SubscribedTopic>),
            );
            coordinators.extend(
                registries
                    .groups
                    .iter()
                    .filter(|(group_key, _)| **group_key != key)
                    .map(|(_, topic)| Arc::clone(topic) as Arc<dyn SubscribedTopic>),
            );
            (owner, coordinators)
        };

        let mut handled = owner.is_some_and(|topic| topic.handle_update(update));
        for coordinator in coordinators {
            handled |= coordinator.handle_update(update);
        }

        if !handled {
            trace!(content_id = %update.identifier, "No topic claimed update");
        }
        handled
    }
}

impl ContentUpdateHandler for SubscriptionOrchestrator {
    fn handle(&self, update: ContentUpdate) {
        self.dispatch(&update);
    }
}
