use serde::{Deserialize, Serialize};

/// State of the upstream socket transport. Observed, never driven, here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectorState {
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}
