//! Sports-list topics: live, pre-live and all sports.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::registrar::TopicRegistrar;
use crate::application::stream::ContentStream;
use crate::application::topic::{SubscribedTopic, Topic};
use crate::domain::{ContentChange, ContentIdentifier, ContentUpdate, SportType, TokenHash};
use crate::error::SubscribeError;

/// Live, pre-live or full sports list.
pub struct SportsCoordinator {
    topic: Topic<Vec<SportType>>,
    sports: RwLock<Vec<SportType>>,
}

impl SportsCoordinator {
    pub(crate) fn new(
        identifier: ContentIdentifier,
        session: TokenHash,
        registrar: TopicRegistrar,
    ) -> Self {
        Self {
            topic: Topic::new(identifier, session, registrar),
            sports: RwLock::new(Vec::new()),
        }
    }

    pub(crate) async fn attach(&self) -> Result<ContentStream<Vec<SportType>>, SubscribeError> {
        self.topic.attach().await
    }

    #[must_use]
    pub fn sports(&self) -> Vec<SportType> {
        self.sports.read().clone()
    }

    pub fn update_sports(&self, sports: Vec<SportType>) {
        *self.sports.write() = sports.clone();
        self.topic.publish(sports);
    }

    /// Insert or replace one sport, keyed by alpha id (numeric id as fallback).
    pub fn add_sport(&self, sport: SportType) {
        let snapshot = {
            let mut sports = self.sports.write();
            let existing = sport.merge_key().and_then(|key| {
                sports
                    .iter()
                    .position(|candidate| candidate.merge_key() == Some(key))
            });
            match existing {
                Some(index) => sports[index] = sport,
                None => sports.push(sport),
            }
            sports.clone()
        };
        self.topic.publish(snapshot);
    }
}

#[async_trait]
impl SubscribedTopic for SportsCoordinator {
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
            ContentChange::Sports(sports) => self.update_sports(sports.clone()),
            ContentChange::AddSport(sport) => self.add_sport(sport.clone()),
            _ => return false,
        }
        true
    }
}
