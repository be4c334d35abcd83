//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for events, markets, sports, content
//! identifiers and socket frames so tests focus on assertions rather than
//! construction boilerplate.

use serde_json::json;

use crate::domain::{
    ContentIdentifier, ContentRoute, Event, EventId, Market, MarketId, Odd, Outcome, OutcomeId,
    SportId, SportType,
};

/// Tradable outcome with odd `1/1`.
pub fn outcome(id: &str) -> Outcome {
    Outcome {
        id: OutcomeId::new(id),
        name: id.to_string(),
        odd: Odd::new(1, 1),
        is_tradable: true,
    }
}

/// Tradable market with no owning event and the given outcomes.
pub fn market_with_outcomes(id: &str, outcomes: &[&str]) -> Market {
    Market {
        id: MarketId::new(id),
        name: id.to_string(),
        event_id: None,
        is_tradable: true,
        outcomes: outcomes.iter().map(|o| outcome(o)).collect(),
    }
}

/// Event `event` holding one market `market` with one outcome `outcome`.
pub fn event_with_market(event: &str, market: &str, outcome: &str) -> Event {
    let mut built = Event::new(event);
    let mut market = market_with_outcomes(market, &[outcome]);
    market.event_id = Some(EventId::new(event));
    built.markets.push(market);
    built
}

/// `count` events named `{prefix}0`, `{prefix}1`, ...
pub fn events(prefix: &str, count: usize) -> Vec<Event> {
    (0..count).map(|i| Event::new(format!("{prefix}{i}"))).collect()
}

pub fn sport(alpha_id: &str, name: &str) -> SportType {
    SportType::new(alpha_id, name)
}

/// Live list identifier of `sport`, first page.
pub fn live_list(sport: &str) -> ContentIdentifier {
    ContentIdentifier::new(ContentRoute::LiveEvents {
        sport_id: SportId::new(sport),
        page_index: 0,
    })
}

pub fn event_details(event: &str) -> ContentIdentifier {
    ContentIdentifier::new(ContentRoute::EventDetails {
        event_id: EventId::new(event),
    })
}

pub fn market_topic(market: &str) -> ContentIdentifier {
    ContentIdentifier::new(ContentRoute::Market {
        market_id: MarketId::new(market),
    })
}

/// `LISTENING_STARTED` frame carrying `token`.
pub fn listening_started_frame(token: &str) -> String {
    json!({ "notificationType": "LISTENING_STARTED", "data": token }).to_string()
}

/// `CONTENT_CHANGES` frame carrying a single snapshot container.
pub fn snapshot_frame(identifier: &ContentIdentifier, change: serde_json::Value) -> String {
    json!({
        "notificationType": "CONTENT_CHANGES",
        "data": [{ "contentId": identifier, "change": change }],
    })
    .to_string()
}

/// `CONTENT_CHANGES` frame carrying a single incremental container.
pub fn change_frame(
    identifier: &ContentIdentifier,
    path: &str,
    change_type: &str,
    change: serde_json::Value,
) -> String {
    json!({
        "notificationType": "CONTENT_CHANGES",
        "data": [{
            "contentId": identifier,
            "path": path,
            "changeType": change_type,
            "change": change,
        }],
    })
    .to_string()
}
