//! Feed runtime: pumps transport tokens and frames into the orchestrator.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::adapter::inbound::socket::{SocketMessageDecoder, SocketNotification};
use crate::application::SubscriptionOrchestrator;
use crate::domain::ConnectorState;
use crate::error::{Error, Result};
use crate::port::outbound::SocketTransport;

/// Connects one [`SocketTransport`] to one [`SubscriptionOrchestrator`].
pub struct FeedRuntime {
    orchestrator: Arc<SubscriptionOrchestrator>,
    transport: Arc<dyn SocketTransport>,
    decoder: SocketMessageDecoder,
}

impl FeedRuntime {
    pub fn new(
        orchestrator: Arc<SubscriptionOrchestrator>,
        transport: Arc<dyn SocketTransport>,
    ) -> Self {
        Self {
            orchestrator,
            transport,
            decoder: SocketMessageDecoder::new(),
        }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &Arc<SubscriptionOrchestrator> {
        &self.orchestrator
    }

    /// Connection state as reported by the transport.
    pub fn connection_state(&self) -> watch::Receiver<ConnectorState> {
        self.transport.connection_state()
    }

    /// Ask the transport to reconnect unless it is already connected.
    /// Returns whether a refresh was requested.
    pub async fn reconnect_if_needed(&self) -> bool {
        let state = *self.transport.connection_state().borrow();
        if state.is_connected() {
            return false;
        }
        info!(?state, "Requesting socket reconnection");
        self.transport.refresh_connection().await;
        true
    }

    /// Decode one raw frame and feed it to the orchestrator.
    /// Returns the number of updates some topic applied.
    pub async fn handle_frame(&self, frame: &str) -> usize {
        match self.decoder.decode(frame) {
            Ok(SocketNotification::ListeningStarted { session_token }) => {
                self.orchestrator.on_socket_token(Some(session_token)).await;
                0
            }
            Ok(SocketNotification::ContentChanges(updates)) => updates
                .into_iter()
                .filter(|update| self.orchestrator.dispatch(update))
                .count(),
            Ok(SocketNotification::Unknown) => 0,
            Err(err) => {
                warn!(error = %err, "Dropping undecodable frame");
                0
            }
        }
    }

    /// Run until `shutdown` flips to true or the transport goes away.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport's frame stream was already taken.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut frames = self
            .transport
            .take_frames()
            .ok_or_else(|| Error::Transport("frame stream already taken".into()))?;
        let mut tokens = self.transport.session_tokens();

        let initial = tokens.borrow_and_update().clone();
        if initial.is_some() {
            self.orchestrator.on_socket_token(initial).await;
        }

        info!("Feed runtime started");
        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                result = tokens.changed() => {
                    if result.is_err() {
                        warn!("Session token stream closed");
                        break;
                    }
                    let token = tokens.borrow_and_update().clone();
                    if let Some(summary) = self.orchestrator.on_socket_token(token).await {
                        info!(replayed = summary.replayed, failed = summary.failed, "Replay finished");
                    }
                }
                frame = frames.recv() => {
                    let Some(frame) = frame else {
                        warn!("Frame stream ended");
                        break;
                    };
                    let applied = self.handle_frame(&frame).await;
                    debug!(applied, "Frame processed");
                }
            }
        }
        Ok(())
    }
}
