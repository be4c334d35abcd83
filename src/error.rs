use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures of a single subscribe, next-page or routing call.
///
/// These are terminal for the call that raised them only. Other active
/// topics keep running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// No usable socket session token; the caller must authenticate first.
    #[error("user session not found")]
    UserSessionNotFound,

    /// A content route cannot be built from the given domain object.
    #[error("incomplete sport data: {0}")]
    IncompletedSportData(String),

    /// The REST subscribe call failed (transport error or non-2xx status).
    #[error("subscribe request failed")]
    OnSubscribe,

    /// No active paginator or coordinator serves the requested topic.
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// The subscribe request could not be serialized.
    #[error("invalid request format: {0}")]
    InvalidRequestFormat(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Subscribe(#[from] SubscribeError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
