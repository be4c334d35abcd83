//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`outbound::SubscriptionApi`] - REST topic registration
//! - [`outbound::SocketTransport`] - push channel: session tokens, frames, connection state
//! - [`outbound::TokenRefresher`] - forced credential refresh per token name
//! - [`inbound::ContentUpdateHandler`] - single entry point for decoded updates

pub mod inbound;
pub mod outbound;
