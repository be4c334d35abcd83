//! REST topic registration.

mod client;
mod dto;

pub use client::RestSubscriptionApi;
