//! Transport-agnostic domain types of the live feed.

mod connection;
mod content;
mod event;
mod id;
mod market;
mod sport;
mod token;
mod update;

pub use connection::ConnectorState;
pub use content::{
    ContentIdentifier, ContentParseError, ContentRoute, ContentType, EventListSort, PageableId,
};
pub use event::{Event, EventLiveData, EventsGroup};
pub use id::{EventId, MarketGroupId, MarketId, OutcomeId, SportId};
pub use market::{Market, Odd, Outcome};
pub use sport::SportType;
pub use token::{TokenHash, TokenName};
pub use update::{ContentChange, ContentUpdate};
