//! Infrastructure configuration modules.

pub mod logging;
pub mod service;
pub mod settings;

pub use logging::LoggingConfig;
pub use service::{HttpConfig, ServiceConfig};
pub use settings::Config;
