//! Subscription orchestrator: the façade of the engine.
//!
//! Owns one registry per topic kind, keyed by pageable id. Subscribing reuses
//! the active topic registered for the same pageable id or creates one;
//! inbound updates are routed by pageable id and offered to every detail
//! coordinator; a session-token change replays every active topic.

mod dispatch;
mod reconnect;
mod registry;
mod routing;
mod service;

pub use reconnect::ReplaySummary;
pub use service::{EventListQuery, ProviderSettings, SubscriptionOrchestrator};
