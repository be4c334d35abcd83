//! Single-market topic, optionally tied to its owning event.

use async_trait::async_trait;
use tracing::debug;

use crate::application::registrar::TopicRegistrar;
use crate::application::storage::MarketStorage;
use crate::application::stream::{ContentStream, EntityUpdates};
use crate::application::topic::{SubscribedTopic, Topic};
use crate::domain::{
    ContentChange, ContentIdentifier, ContentRoute, ContentUpdate, EventId, Market, MarketId,
    Outcome, OutcomeId, TokenHash,
};
use crate::error::SubscribeError;

/// Tracks one market of an event.
pub struct MarketDetailsCoordinator {
    market_id: MarketId,
    event_id: Option<EventId>,
    topic: Topic<Market>,
    storage: MarketStorage,
}

impl MarketDetailsCoordinator {
    pub(crate) fn new(
        market_id: MarketId,
        event_id: Option<EventId>,
        session: TokenHash,
        registrar: TopicRegistrar,
    ) -> Self {
        let identifier = ContentIdentifier::new(ContentRoute::Market {
            market_id: market_id.clone(),
        });
        Self {
            market_id,
            event_id,
            topic: Topic::new(identifier, session, registrar),
            storage: MarketStorage::new(),
        }
    }

    pub(crate) async fn attach(&self) -> Result<ContentStream<Market>, SubscribeError> {
        self.topic.attach().await
    }

    #[must_use]
    pub fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }

    #[must_use]
    pub fn market(&self) -> Option<Market> {
        self.storage.market()
    }

    pub fn update_market(&self, market: Option<Market>) {
        let market = market.map(|mut market| {
            if market.event_id.is_none() {
                market.event_id.clone_from(&self.event_id);
            }
            market
        });
        if self.storage.set_market(market) {
            self.publish();
        }
    }

    fn publish(&self) {
        match self.storage.market() {
            Some(market) => self.topic.publish(market),
            None => debug!(market_id = %self.market_id, "Market removed"),
        }
    }

    #[must_use]
    pub fn contains_market(&self, id: &MarketId) -> bool {
        self.storage.contains_market(id)
    }

    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.storage.contains_outcome(id)
    }

    pub fn subscribe_to_event_market_updates(
        &self,
        id: &MarketId,
    ) -> Option<EntityUpdates<Market>> {
        (id == &self.market_id).then(|| {
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
impl SubscribedTopic for MarketDetailsCoordinator {
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
            ContentChange::MarketDetails(market) if update.identifier == *self.topic.identifier() => {
                self.update_market(market.clone());
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
