//! Reconnection replay on socket-session rotation.

use futures_util::future::join_all;
use tracing::{info, warn};

use super::SubscriptionOrchestrator;
use crate::domain::{TokenHash, TokenName};

#[derive(Debug, Default)]
pub(super) struct SessionTracker {
    current: Option<String>,
    established: bool,
}

/// Outcome of one replay round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub replayed: usize,
    pub failed: usize,
}

impl SubscriptionOrchestrator {
    /// React to a socket-session token reported by the transport.
    ///
    /// - the first token ever is the initial connection: nothing to replay
    /// - a different token is a reconnection: purge released topics, then
    ///   re-register every remaining one under the new token
    /// - `None` clears the session and marks every topic disconnected
    ///
    /// Repeated values are ignored. Returns what was replayed, if anything.
    pub async fn on_socket_token(&self, token: Option<String>) -> Option<ReplaySummary> {
        let replay = {
            let mut session = self.session.lock();
            if session.current == token {
                return None;
            }
            session.current.clone_from(&token);
            let replay = session.established;
            if token.is_some() {
                session.established = true;
            }
            replay
        };

        let Some(token) = token else {
            self.tokens.clear(TokenName::SocketSession);
            self.mark_all_disconnected();
            return None;
        };

        self.tokens.save(TokenName::SocketSession, token.clone());
        if !replay {
            info!("Socket session established");
            return None;
        }

        Some(self.replay(&TokenHash::of(&token)).await)
    }

    fn mark_all_disconnected(&self) {
        let topics = self.registries.lock().topics();
        info!(topics = topics.len(), "Socket session lost");
        for topic in topics {
            topic.mark_disconnected();
        }
    }

    /// Re-register every active topic under `session`. Topics replay
    /// concurrently; a failure only deactivates the topic that failed.
    pub(super) async fn replay(&self, session: &TokenHash) -> ReplaySummary {
        let topics = {
            let mut registries = self.registries.lock();
            registries.purge_inactive();
            registries.topics()
        };

        info!(topics = topics.len(), "Replaying subscriptions on new session");
        let results = join_all(topics.iter().map(|topic| topic.reconnect(session))).await;

        let failed = results.iter().filter(|replayed| !**replayed).count();
        if failed > 0 {
            warn!(failed, "Some topics failed to resubscribe");
            self.registries.lock().purge_inactive();
        }

        ReplaySummary {
            replayed: results.len() - failed,
            failed,
        }
    }
}
