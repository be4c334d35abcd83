//! Subscribe operations and the orchestrator state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::reconnect::SessionTracker;
use super::registry::{Registered, Registries};
use crate::application::coordinator::{
    EventDetailsCoordinator, EventGroupCoordinator, MarketDetailsCoordinator, SportsCoordinator,
};
use crate::application::paginator::ListPaginator;
use crate::application::registrar::TopicRegistrar;
use crate::application::stream::ContentStream;
use crate::application::token::TokenRegistry;
use crate::domain::{
    ContentIdentifier, ContentRoute, Event, EventId, EventListSort, EventsGroup, Market,
    MarketGroupId, MarketId, SportType, TokenHash, TokenName,
};
use crate::error::SubscribeError;

/// Tunables of the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSettings {
    /// Page size of list topics whose route carries none.
    pub default_page_size: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
        }
    }
}

/// Parameters of a paged event list.
#[derive(Debug, Clone)]
pub enum EventListQuery {
    PreLive {
        sport: SportType,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        sort: EventListSort,
    },
    Live {
        sport: SportType,
    },
}

impl EventListQuery {
    fn identifier(&self, page_size: u32) -> Result<ContentIdentifier, SubscribeError> {
        let sport = match self {
            Self::PreLive { sport, .. } | Self::Live { sport } => sport,
        };
        let sport_id = sport.alpha_id.clone().ok_or_else(|| {
            SubscribeError::IncompletedSportData(format!("sport '{}' has no alpha id", sport.name))
        })?;

        let route = match self {
            Self::PreLive {
                start_date,
                end_date,
                sort,
                ..
            } => ContentRoute::PreLiveEvents {
                sport_id,
                start_date: *start_date,
                end_date: *end_date,
                page_index: 0,
                page_size,
                sort: *sort,
            },
            Self::Live { .. } => ContentRoute::LiveEvents {
                sport_id,
                page_index: 0,
            },
        };
        Ok(ContentIdentifier::new(route))
    }
}

pub struct SubscriptionOrchestrator {
    registrar: TopicRegistrar,
    pub(super) tokens: Arc<TokenRegistry>,
    settings: ProviderSettings,
    pub(super) registries: Mutex<Registries>,
    pub(super) session: Mutex<SessionTracker>,
}

impl SubscriptionOrchestrator {
    pub fn new(
        registrar: TopicRegistrar,
        tokens: Arc<TokenRegistry>,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            registrar,
            tokens,
            settings,
            registries: Mutex::new(Registries::default()),
            session: Mutex::new(SessionTracker::default()),
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenRegistry> {
        &self.tokens
    }

    fn current_session(&self) -> Result<TokenHash, SubscribeError> {
        self.tokens
            .current_hash(TokenName::SocketSession)
            .ok_or(SubscribeError::UserSessionNotFound)
    }

    /// Reuse-or-create a topic of kind `C` and attach a stream to it.
    /// A failed first subscribe removes the topic from its registry again.
    async fn subscribe_topic<C: Registered>(
        &self,
        identifier: ContentIdentifier,
        create: impl FnOnce(ContentIdentifier, TokenHash) -> C + Send,
    ) -> Result<(Arc<C>, ContentStream<C::Content>), SubscribeError> {
        let session = self.current_session()?;
        let key = identifier.pageable_id();

        let topic = {
            let mut registries = self.registries.lock();
            registries.purge_inactive();
            registries.find_or_insert(key.clone(), || create(identifier, session))
        };

        match topic.attach().await {
            Ok(stream) => Ok((topic, stream)),
            Err(err) => {
                self.registries.lock().discard(&key, &topic);
                Err(err)
            }
        }
    }

    /// Subscribe to a paged event list.
    pub async fn subscribe_events(
        &self,
        query: &EventListQuery,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        let page_size = self.settings.default_page_size;
        let identifier = query.identifier(page_size)?;
        let registrar = self.registrar.clone();

        let (_, stream) = self
            .subscribe_topic(identifier, move |identifier, session| {
                ListPaginator::new(identifier, session, registrar, page_size)
            })
            .await?;
        Ok(stream)
    }

    pub async fn subscribe_pre_live_matches(
        &self,
        sport: &SportType,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        sort: EventListSort,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.subscribe_events(&EventListQuery::PreLive {
            sport: sport.clone(),
            start_date,
            end_date,
            sort,
        })
        .await
    }

    pub async fn subscribe_live_matches(
        &self,
        sport: &SportType,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.subscribe_events(&EventListQuery::Live {
            sport: sport.clone(),
        })
        .await
    }

    /// Request the next page of a list subscribed with the same query.
    pub async fn request_next_page(&self, query: &EventListQuery) -> Result<bool, SubscribeError> {
        let key = query
            .identifier(self.settings.default_page_size)?
            .pageable_id();
        let paginator = {
            let mut registries = self.registries.lock();
            registries.purge_inactive();
            registries.paginators.get(&key).cloned()
        };
        match paginator {
            Some(paginator) => paginator.request_next_page().await,
            None => Err(SubscribeError::SubscriptionNotFound),
        }
    }

    pub async fn subscribe_event_details(
        &self,
        event_id: &EventId,
    ) -> Result<ContentStream<Event>, SubscribeError> {
        self.event_details_topic(event_id)
            .await
            .map(|(_, stream)| stream)
    }

    pub(super) async fn event_details_topic(
        &self,
        event_id: &EventId,
    ) -> Result<(Arc<EventDetailsCoordinator>, ContentStream<Event>), SubscribeError> {
        let identifier = ContentIdentifier::new(ContentRoute::EventDetails {
            event_id: event_id.clone(),
        });
        let registrar = self.registrar.clone();
        let event_id = event_id.clone();
        self.subscribe_topic(identifier, move |_, session| {
            EventDetailsCoordinator::new(event_id, session, registrar)
        })
        .await
    }

    pub async fn subscribe_market_details(
        &self,
        market_id: &MarketId,
        event_id: Option<&EventId>,
    ) -> Result<ContentStream<Market>, SubscribeError> {
        let identifier = ContentIdentifier::new(ContentRoute::Market {
            market_id: market_id.clone(),
        });
        let registrar = self.registrar.clone();
        let market_id = market_id.clone();
        let event_id = event_id.cloned();
        let (_, stream) = self
            .subscribe_topic(identifier, move |_, session| {
                MarketDetailsCoordinator::new(market_id, event_id, session, registrar)
            })
            .await?;
        Ok(stream)
    }

    async fn subscribe_group(
        &self,
        route: ContentRoute,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        let registrar = self.registrar.clone();
        let (_, stream) = self
            .subscribe_topic(ContentIdentifier::new(route), move |identifier, session| {
                EventGroupCoordinator::new(identifier, session, registrar)
            })
            .await?;
        Ok(stream)
    }

    /// Matches of one competition.
    pub async fn subscribe_competition_matches(
        &self,
        market_group_id: &MarketGroupId,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.subscribe_group(ContentRoute::EventGroup {
            market_group_id: market_group_id.clone(),
        })
        .await
    }

    pub async fn subscribe_outright_markets(
        &self,
        market_group_id: &MarketGroupId,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.subscribe_group(ContentRoute::OutrightEventGroup {
            market_group_id: market_group_id.clone(),
        })
        .await
    }

    pub async fn subscribe_event_summary(
        &self,
        event_id: &EventId,
    ) -> Result<ContentStream<Vec<EventsGroup>>, SubscribeError> {
        self.subscribe_group(ContentRoute::EventSummary {
            event_id: event_id.clone(),
        })
        .await
    }

    async fn subscribe_sports(
        &self,
        route: ContentRoute,
    ) -> Result<ContentStream<Vec<SportType>>, SubscribeError> {
        let registrar = self.registrar.clone();
        let (_, stream) = self
            .subscribe_topic(ContentIdentifier::new(route), move |identifier, session| {
                SportsCoordinator::new(identifier, session, registrar)
            })
            .await?;
        Ok(stream)
    }

    pub async fn subscribe_live_sport_types(
        &self,
    ) -> Result<ContentStream<Vec<SportType>>, SubscribeError> {
        self.subscribe_sports(ContentRoute::LiveSports).await
    }

    pub async fn subscribe_pre_live_sport_types(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<ContentStream<Vec<SportType>>, SubscribeError> {
        self.subscribe_sports(ContentRoute::PreLiveSports {
            start_date,
            end_date,
        })
        .await
    }

    pub async fn subscribe_all_sport_types(
        &self,
    ) -> Result<ContentStream<Vec<SportType>>, SubscribeError> {
        self.subscribe_sports(ContentRoute::AllSports).await
    }

    /// Identifiers of every active topic, after purging released ones.
    #[must_use]
    pub fn active_topics(&self) -> Vec<ContentIdentifier> {
        let mut registries = self.registries.lock();
        registries.purge_inactive();
        registries
            .topics()
            .iter()
            .map(|topic| topic.content_identifier().clone())
            .collect()
    }
}
