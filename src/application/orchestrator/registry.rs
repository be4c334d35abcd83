//! Pageable-id registries of every live topic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::coordinator::{
    EventDetailsCoordinator, EventGroupCoordinator, MarketDetailsCoordinator, SportsCoordinator,
};
use crate::application::paginator::ListPaginator;
use crate::application::stream::ContentStream;
use crate::application::topic::SubscribedTopic;
use crate::domain::{Event, EventsGroup, Market, PageableId, SportType};
use crate::error::SubscribeError;

/// A topic kind the orchestrator keeps a registry for.
#[async_trait]
pub(crate) trait Registered: SubscribedTopic + Sized + 'static {
    type Content: Clone + Send + Sync + 'static;

    fn registry(registries: &mut Registries) -> &mut HashMap<PageableId, Arc<Self>>;

    async fn attach(&self) -> Result<ContentStream<Self::Content>, SubscribeError>;
}

#[derive(Default)]
pub(crate) struct Registries {
    pub(super) paginators: HashMap<PageableId, Arc<ListPaginator>>,
    pub(super) event_details: HashMap<PageableId, Arc<EventDetailsCoordinator>>,
    pub(super) markets: HashMap<PageableId, Arc<MarketDetailsCoordinator>>,
    pub(super) groups: HashMap<PageableId, Arc<EventGroupCoordinator>>,
    pub(super) sports: HashMap<PageableId, Arc<SportsCoordinator>>,
}

impl Registries {
    /// Reuse the active topic registered under `key`, or register a new one.
    pub(super) fn find_or_insert<C: Registered>(
        &mut self,
        key: PageableId,
        create: impl FnOnce() -> C,
    ) -> Arc<C> {
        let registry = C::registry(self);
        if let Some(existing) = registry.get(&key).filter(|topic| topic.is_active()) {
            return Arc::clone(existing);
        }
        let created = Arc::new(create());
        registry.insert(key, Arc::clone(&created));
        created
    }

    /// Remove `topic` if it is still the entry registered under `key`.
    pub(super) fn discard<C: Registered>(&mut self, key: &PageableId, topic: &Arc<C>) {
        let registry = C::registry(self);
        if registry
            .get(key)
            .is_some_and(|registered| Arc::ptr_eq(registered, topic))
        {
            registry.remove(key);
        }
    }

    /// Drop every topic whose handle was released or whose replay failed.
    pub(super) fn purge_inactive(&mut self) -> usize {
        let before = self.len();
        self.paginators.retain(|_, topic| topic.is_active());
        self.event_details.retain(|_, topic| topic.is_active());
        self.markets.retain(|_, topic| topic.is_active());
        self.groups.retain(|_, topic| topic.is_active());
        self.sports.retain(|_, topic| topic.is_active());
        let purged = before - self.len();
        if purged > 0 {
            debug!(purged, remaining = self.len(), "Purged inactive topics");
        }
        purged
    }

    pub(super) fn len(&self) -> usize {
        self.paginators.len()
            + self.event_details.len()
            + self.markets.len()
            + self.groups.len()
            + self.sports.len()
    }

    /// Every registered topic, paginators first.
    pub(super) fn topics(&self) -> Vec<Arc<dyn SubscribedTopic>> {
        let mut topics: Vec<Arc<dyn SubscribedTopic>> = Vec::with_capacity(self.len());
        topics.extend(self.paginators.values().map(|t| Arc::clone(t) as Arc<dyn SubscribedTopic>));
        topics.extend(self.event_details.values().map(|t| Arc::clone(t) as Arc<dyn SubscribedTopic>));
        topics.extend(self.markets.values().map(|t| Arc::clone(t) as Arc<dyn SubscribedTopic>));
        topics.extend(self.groups.values().map(|t| Arc::clone(t) as Arc<dyn SubscribedTopic>));
        topics.extend(self.sports.values().map(|t| Arc::clone(t) as Arc<dyn SubscribedTopic>));
        topics
    }
}

#[async_trait]
impl Registered for ListPaginator {
    type Content = Vec<EventsGroup>;

    fn registry(registries: &mut Registries) -> &mut HashMap<PageableId, Arc<Self>> {
        &mut registries.paginators
    }

    async fn attach(&self) -> Result<ContentStream<Self::Content>, SubscribeError> {
        self.request_initial_page().await
    }
}

#[async_trait]
impl Registered for EventDetailsCoordinator {
    type Content = Event;

    fn registry(registries: &mut Registries) -> &mut HashMap<PageableId, Arc<Self>> {
        &mut registries.event_details
    }

    async fn attach(&self) -> Result<ContentStream<Self::Content>, SubscribeError> {
        EventDetailsCoordinator::attach(self).await
    }
}

#[async_trait]
impl Registered for MarketDetailsCoordinator {
    type Content = Market;

    fn registry(registries: &mut Registries) -> &mut HashMap<PageableId, Arc<Self>> {
        &mut registries.markets
    }

    async fn attach(&self) -> Result<ContentStream<Self::Content>, SubscribeError> {
        MarketDetailsCoordinator::attach(self).await
    }
}

#[async_trait]
impl Registered for EventGroupCoordinator {
    type Content = Vec<EventsGroup>;

    fn registry(registries: &mut Registries) -> &mut HashMap<PageableId, Arc<Self>> {
        &mut registries.groups
    }

    async fn attach(&self) -> Result<ContentStream<Self::Content>, SubscribeError> {
        EventGroupCoordinator::attach(self).await
    }
}

#[async_trait]
impl Registered for SportsCoordinator {
    type Content = Vec<SportType>;

    fn registry(registries: &mut Registries) -> &mut HashMap<PageableId, Arc<Self>> {
        &mut registries.sports
    }

    async fn attach(&self) -> Result<ContentStream<Self::Content>, SubscribeError> {
        SportsCoordinator::attach(self).await
    }
}
