//! Request bodies of the content subscription endpoints.

use serde::Serialize;

use crate::domain::{ContentIdentifier, TokenHash};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ClientContext<'a> {
    pub language: &'a str,
    pub ip_address: &'a str,
}

/// Body shared by subscribe and unsubscribe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubscriptionRequest<'a> {
    pub subscriber_id: &'a TokenHash,
    pub content_id: &'a ContentIdentifier,
    pub client_context: ClientContext<'a>,
}
