//! Inbound ports: how the outside world drives the engine.

mod update;

pub use update::ContentUpdateHandler;
