//! Sportsync - live sports-data subscription engine.
//!
//! Callers subscribe to feed topics (event lists, event details, markets,
//! competitions, sports lists) and receive streams of content. Topics are
//! registered over REST under the current socket session; updates arrive on
//! the socket and are routed to every topic that holds the affected entity.
//! When the socket session rotates, every live topic is registered again
//! under the new session.
//!
//! # Architecture
//!
//! - [`domain`] - Transport-agnostic types: events, markets, content identifiers, updates
//! - [`port`] - Traits at the edges: REST subscription API, socket transport, update handler
//! - [`adapter`] - `reqwest` subscription API and the socket frame decoder
//! - [`application`] - Topic lifecycles, storages, paginator, coordinators, orchestrator
//! - [`infrastructure`] - Configuration, logging, composition root, feed runtime
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use sportsync::application::EventListQuery;
//! use sportsync::domain::SportType;
//! use sportsync::infrastructure::bootstrap::build_orchestrator;
//! use sportsync::infrastructure::config::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("sportsync.toml")?;
//! config.init_logging();
//!
//! let orchestrator = build_orchestrator(&config)?;
//! let query = EventListQuery::Live { sport: SportType::new("FBL", "Football") };
//! let mut stream = orchestrator.subscribe_events(&query).await?;
//! while let Some(item) = stream.next().await {
//!     println!("{item:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
