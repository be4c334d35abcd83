//! Socket transport port.
//!
//! Connection management, heartbeats and token issuance live behind this
//! trait. The engine only observes what the transport reports.

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::domain::ConnectorState;

#[async_trait]
pub trait SocketTransport: Send + Sync {
    /// Current socket session token; `None` while unauthenticated.
    fn session_tokens(&self) -> watch::Receiver<Option<String>>;

    /// Connection state of the underlying socket.
    fn connection_state(&self) -> watch::Receiver<ConnectorState>;

    /// Raw text frames in arrival order. Can be taken once.
    fn take_frames(&self) -> Option<mpsc::Receiver<String>>;

    /// Ask the transport to reconnect if it is not connected.
    async fn refresh_connection(&self);
}
