//! Sport types listed by the sports-list topics.

use serde::{Deserialize, Serialize};

use super::id::SportId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportType {
    /// Alphabetic code (`FBL`, `TNS`, ...). Required to build list routes.
    #[serde(default)]
    pub alpha_id: Option<SportId>,
    #[serde(default)]
    pub numeric_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub live_event_count: u32,
    #[serde(default)]
    pub event_count: u32,
}

impl SportType {
    pub fn new(alpha_id: impl Into<SportId>, name: impl Into<String>) -> Self {
        Self {
            alpha_id: Some(alpha_id.into()),
            numeric_id: None,
            name: name.into(),
            live_event_count: 0,
            event_count: 0,
        }
    }

    /// Key used to merge sports lists: alpha id first, numeric id otherwise.
    #[must_use]
    pub fn merge_key(&self) -> Option<&str> {
        self.alpha_id
            .as_ref()
            .map(SportId::as_str)
            .or(self.numeric_id.as_deref())
    }
}
