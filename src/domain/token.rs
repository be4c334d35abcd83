//! Named credentials and their routing-safe hashes.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Credentials tracked by the token registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenName {
    #[serde(rename = "launchToken")]
    Launch,
    #[serde(rename = "socketSessionToken")]
    SocketSession,
    #[serde(rename = "restSessionToken")]
    RestSession,
}

impl TokenName {
    pub const ALL: [TokenName; 3] = [Self::Launch, Self::SocketSession, Self::RestSession];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "launchToken",
            Self::SocketSession => "socketSessionToken",
            Self::RestSession => "restSessionToken",
        }
    }
}

impl fmt::Display for TokenName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SHA-256 hex digest of a raw token.
///
/// This is the value sent as `subscriberId`; raw tokens never leave the
/// registry.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenHash(String);

impl TokenHash {
    /// Hash a raw token value.
    #[must_use]
    pub fn of(raw: &str) -> Self {
        Self(hex::encode(Sha256::digest(raw.as_bytes())))
    }

    /// Wrap an already hashed value.
    pub fn from_hashed(hashed: impl Into<String>) -> Self {
        Self(hashed.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..8).unwrap_or(&self.0);
        write!(f, "TokenHash({prefix}..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_hides_raw_value() {
        let first = TokenHash::of("secret-token");
        let second = TokenHash::of("secret-token");
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
        assert!(!first.as_str().contains("secret"));
        assert_ne!(first, TokenHash::of("other-token"));
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            TokenHash::of("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn token_names_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokenName::SocketSession).unwrap(),
            "\"socketSessionToken\""
        );
    }
}
