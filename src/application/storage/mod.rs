//! In-memory aggregates owned by paginators and coordinators.

mod events;
mod market;
mod watchers;

pub use events::EventsStorage;
pub use market::MarketStorage;
