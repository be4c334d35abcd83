//! Outbound ports: what the engine needs from the outside world.

mod subscription;
mod token;
mod transport;

pub use subscription::SubscriptionApi;
pub use token::TokenRefresher;
pub use transport::SocketTransport;
