//! Sporting events and the groups the feed delivers them in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EventId, MarketGroupId, MarketId, OutcomeId, SportId};
use super::market::{Market, Outcome};

/// Live scoreboard fields of an event.
///
/// Every field is optional: partial live-data updates only carry what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLiveData {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub match_time: Option<String>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
}

impl EventLiveData {
    /// Overlay the fields present in `other` onto `self`.
    pub fn merge(&mut self, other: &EventLiveData) {
        if other.status.is_some() {
            self.status.clone_from(&other.status);
        }
        if other.match_time.is_some() {
            self.match_time.clone_from(&other.match_time);
        }
        if other.home_score.is_some() {
            self.home_score = other.home_score;
        }
        if other.away_score.is_some() {
            self.away_score = other.away_score;
        }
    }
}

/// A sporting event with the markets currently offered on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub home_team_name: String,
    #[serde(default)]
    pub away_team_name: String,
    #[serde(default)]
    pub sport_id: Option<SportId>,
    #[serde(default)]
    pub competition_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub market_count: Option<u32>,
    #[serde(default)]
    pub live_data: EventLiveData,
    #[serde(default)]
    pub markets: Vec<Market>,
}

impl Event {
    /// Create an event with no markets or live data.
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            home_team_name: String::new(),
            away_team_name: String::new(),
            sport_id: None,
            competition_name: None,
            start_date: None,
            market_count: None,
            live_data: EventLiveData::default(),
            markets: Vec::new(),
        }
    }

    #[must_use]
    pub fn market(&self, id: &MarketId) -> Option<&Market> {
        self.markets.iter().find(|market| &market.id == id)
    }

    pub(crate) fn market_mut(&mut self, id: &MarketId) -> Option<&mut Market> {
        self.markets.iter_mut().find(|market| &market.id == id)
    }

    /// Find an outcome in any of this event's markets.
    #[must_use]
    pub fn outcome(&self, id: &OutcomeId) -> Option<&Outcome> {
        self.markets.iter().find_map(|market| market.outcome(id))
    }

    #[must_use]
    pub fn contains_market(&self, id: &MarketId) -> bool {
        self.market(id).is_some()
    }

    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.outcome(id).is_some()
    }
}

/// A list of events, optionally tied to a competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsGroup {
    pub events: Vec<Event>,
    #[serde(default)]
    pub market_group_id: Option<MarketGroupId>,
}

impl EventsGroup {
    #[must_use]
    pub fn new(events: Vec<Event>, market_group_id: Option<MarketGroupId>) -> Self {
        Self {
            events,
            market_group_id,
        }
    }
}
