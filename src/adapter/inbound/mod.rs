//! Inbound adapters (driving side).

pub mod socket;
