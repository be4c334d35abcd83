//! Domain identifier types with proper encapsulation.
//!
//! Every feed entity is addressed by an opaque string id. Each id kind gets
//! its own newtype so an outcome id can never be looked up as a market id.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a string.")]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[doc = concat!("Get the `", stringify!($name), "` as a string slice.")]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Sporting event identifier (a match, race or outright).
    EventId
);

string_id!(
    /// Betting market identifier.
    MarketId
);

string_id!(
    /// Outcome (selection) identifier inside a market.
    OutcomeId
);

string_id!(
    /// Alphabetic sport code used in content routes, e.g. `FBL`.
    SportId
);

string_id!(
    /// Competition / market group identifier.
    MarketGroupId
);
