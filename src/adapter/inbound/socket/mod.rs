//! Socket frame decoding.

mod decoder;
mod path;

pub use decoder::{DecodeError, SocketMessageDecoder, SocketNotification};
