//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`api`]: `RecordingApi`, an in-memory [`SubscriptionApi`](crate::port::outbound::SubscriptionApi)
//!   that records calls and fails on demand.
//! - [`transport`]: `ManualTransport`, a [`SocketTransport`](crate::port::outbound::SocketTransport)
//!   driven by the test.
//! - [`domain`]: Builders for events, markets, sports and socket frames.

pub mod api;
pub mod domain;
pub mod transport;
