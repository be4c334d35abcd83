//! Single-aggregate topics: one event, one market, one event group, one sports list.

mod event;
mod group;
mod market;
mod sports;

pub use event::EventDetailsCoordinator;
pub use group::EventGroupCoordinator;
pub use market::MarketDetailsCoordinator;
pub use sports::SportsCoordinator;
