//! Socket transport driven by the test.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::domain::ConnectorState;
use crate::port::outbound::SocketTransport;

const FRAME_BUFFER: usize = 256;

/// [`SocketTransport`] whose tokens, state and frames are pushed by hand.
pub struct ManualTransport {
    tokens: watch::Sender<Option<String>>,
    state: watch::Sender<ConnectorState>,
    frames_tx: mpsc::Sender<String>,
    frames_rx: Mutex<Option<mpsc::Receiver<String>>>,
    refreshes: AtomicUsize,
}

impl Default for ManualTransport {
    fn default() -> Self {
        let (frames_tx, frames_rx) = mpsc::channel(FRAME_BUFFER);
        Self {
            tokens: watch::channel(None).0,
            state: watch::channel(ConnectorState::Disconnected).0,
            frames_tx,
            frames_rx: Mutex::new(Some(frames_rx)),
            refreshes: AtomicUsize::new(0),
        }
    }
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a new session token, or `None` for a lost session.
    pub fn set_token(&self, token: Option<&str>) {
        self.tokens.send_replace(token.map(str::to_string));
    }

    pub fn set_state(&self, state: ConnectorState) {
        self.state.send_replace(state);
    }

    /// Queue a raw frame for the runtime.
    pub async fn push_frame(&self, frame: impl Into<String>) {
        let _ = self.frames_tx.send(frame.into()).await;
    }

    /// Number of `refresh_connection` calls so far.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SocketTransport for ManualTransport {
    fn session_tokens(&self) -> watch::Receiver<Option<String>> {
        self.tokens.subscribe()
    }

    fn connection_state(&self) -> watch::Receiver<ConnectorState> {
        self.state.subscribe()
    }

    fn take_frames(&self) -> Option<mpsc::Receiver<String>> {
        self.frames_rx.lock().take()
    }

    async fn refresh_connection(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(ConnectorState::Connecting);
    }
}
