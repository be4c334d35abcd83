//! Per-entity routing: bind a caller to whichever topic already tracks an id.
//!
//! Detail coordinators are consulted before lists so a caller viewing one
//! event binds to its detail topic rather than a list snapshot.

use tracing::debug;

use super::SubscriptionOrchestrator;
use crate::application::stream::EntityUpdates;
use crate::domain::{EventId, EventLiveData, Market, MarketId, Outcome, OutcomeId};
use crate::error::SubscribeError;

impl SubscriptionOrchestrator {
    /// Live data of one event. When no topic tracks the event yet, a detail
    /// subscription is created for it.
    pub async fn subscribe_to_event_live_data_updates(
        &self,
        id: &EventId,
    ) -> Result<EntityUpdates<EventLiveData>, SubscribeError> {
        let found = {
            let mut registries = self.registries.lock();
            registries.purge_inactive();
            registries
                .event_details
                .values()
                .find_map(|topic| topic.subscribe_to_event_live_data_updates(id))
                .or_else(|| {
                    registries
                        .paginators
                        .values()
                        .find_map(|topic| topic.subscribe_to_event_live_data_updates(id))
                })
                .or_else(|| {
                    registries
                        .groups
                        .values()
                        .find_map(|topic| topic.subscribe_to_event_live_data_updates(id))
                })
        };
        if let Some(updates) = found {
            return Ok(updates);
        }

        debug!(event_id = %id, "Event not tracked, bootstrapping detail subscription");
        let (coordinator, _stream) = self.event_details_topic(id).await?;
        coordinator
            .subscribe_to_event_live_data_updates(id)
            .ok_or(SubscribeError::SubscriptionNotFound)
    }

    /// Updates of one market tracked by any active topic.
    pub fn subscribe_to_event_market_updates(
        &self,
        id: &MarketId,
    ) -> Result<EntityUpdates<Market>, SubscribeError> {
        let mut registries = self.registries.lock();
        registries.purge_inactive();
        registries
            .event_details
            .values()
            .find_map(|topic| topic.subscribe_to_event_market_updates(id))
            .or_else(|| {
                registries
                    .markets
                    .values()
                    .find_map(|topic| topic.subscribe_to_event_market_updates(id))
            })
            .or_else(|| {
                registries
                    .paginators
                    .values()
                    .find_map(|topic| topic.subscribe_to_event_market_updates(id))
            })
            .or_else(|| {
                registries
                    .groups
                    .values()
                    .find_map(|topic| topic.subscribe_to_event_market_updates(id))
            })
            .ok_or(SubscribeError::SubscriptionNotFound)
    }

    /// Updates of one outcome tracked by any active topic.
    pub fn subscribe_to_event_outcome_updates(
        &self,
        id: &OutcomeId,
    ) -> Result<EntityUpdates<Outcome>, SubscribeError> {
        let mut registries = self.registries.lock();
        registries.purge_inactive();
        registries
            .event_details
            .values()
            .find_map(|topic| topic.subscribe_to_event_outcome_updates(id))
            .or_else(|| {
                registries
                    .markets
                    .values()
                    .find_map(|topic| topic.subscribe_to_event_outcome_updates(id))
            })
            .or_else(|| {
                registries
                    .paginators
                    .values()
                    .find_map(|topic| topic.subscribe_to_event_outcome_updates(id))
            })
            .or_else(|| {
                registries
                    .groups
                    .values()
                    .find_map(|topic| topic.subscribe_to_event_outcome_updates(id))
            })
            .ok_or(SubscribeError::SubscriptionNotFound)
    }
}
