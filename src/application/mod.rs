//! Subscription engine: topic lifecycles, storages and the orchestrator.
//!
//! - [`TokenRegistry`] - named observable credentials
//! - [`TopicRegistrar`] - REST subscribe / unsubscribe with retry
//! - [`Subscription`] - caller-owned handle; dropping the last clone unsubscribes
//! - [`ListPaginator`] and the [`coordinator`] types - one per pageable id
//! - [`SubscriptionOrchestrator`] - registries, routing, dispatch and replay

pub mod coordinator;
pub mod storage;

mod orchestrator;
mod paginator;
mod registrar;
mod stream;
mod subscription;
mod token;
mod topic;

pub use orchestrator::{EventListQuery, ProviderSettings, ReplaySummary, SubscriptionOrchestrator};
pub use paginator::ListPaginator;
pub use registrar::{RegistrarSettings, TopicRegistrar};
pub use stream::{ContentStream, EntityUpdates, SubscribableContent};
pub use subscription::{Subscription, WeakSubscription};
pub use token::TokenRegistry;
pub use topic::{SubscribedTopic, TopicPhase};
