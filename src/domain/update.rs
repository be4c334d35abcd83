//! Inbound content updates.
//!
//! Every socket frame decodes to a [`ContentUpdate`]: the topic it was
//! published on plus a [`ContentChange`]. Full snapshots replace or merge the
//! topic's content; the incremental variants patch one entity.

use super::content::{ContentIdentifier, ContentType};
use super::event::{Event, EventLiveData};
use super::id::{EventId, MarketId, OutcomeId};
use super::market::Market;
use super::sport::SportType;

#[derive(Debug, Clone, PartialEq)]
pub enum ContentChange {
    /// Event list of a list, group or summary topic.
    Events(Vec<Event>),
    /// Sports list snapshot.
    Sports(Vec<SportType>),
    /// Full event of a single-event topic. `None` when the event is gone.
    EventDetails(Option<Event>),
    /// Live scoreboard block of a single-event topic.
    LiveData(Option<EventLiveData>),
    /// Full market of a single-market topic. `None` when the market is gone.
    MarketDetails(Option<Market>),

    AddEvent(Event),
    RemoveEvent(EventId),
    AddMarket(Market),
    /// Market reopened for trading.
    EnableMarket(MarketId),
    /// Market closed for trading. It stays listed with `is_tradable = false`
    /// so a later [`ContentChange::EnableMarket`] can reopen it.
    SuspendMarket(MarketId),
    AddSport(SportType),

    EventState {
        event_id: EventId,
        state: String,
    },
    EventTime {
        event_id: EventId,
        match_time: String,
    },
    EventScore {
        event_id: EventId,
        home: Option<u32>,
        away: Option<u32>,
    },
    EventMarketCount {
        event_id: EventId,
        market_count: u32,
    },
    MarketTradability {
        market_id: MarketId,
        is_tradable: bool,
    },
    OutcomeOdd {
        outcome_id: OutcomeId,
        numerator: Option<String>,
        denominator: Option<String>,
    },
    OutcomeTradability {
        outcome_id: OutcomeId,
        is_tradable: bool,
    },
}

impl ContentChange {
    /// Whether this change patches a single entity rather than replacing content.
    #[must_use]
    pub const fn is_incremental(&self) -> bool {
        !matches!(
            self,
            Self::Events(_)
                | Self::Sports(_)
                | Self::EventDetails(_)
                | Self::LiveData(_)
                | Self::MarketDetails(_)
        )
    }
}

/// A change published on one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUpdate {
    pub identifier: ContentIdentifier,
    pub change: ContentChange,
}

impl ContentUpdate {
    #[must_use]
    pub const fn new(identifier: ContentIdentifier, change: ContentChange) -> Self {
        Self { identifier, change }
    }

    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.identifier.content_type()
    }
}
