//! Caller-owned subscription handles.
//!
//! A [`Subscription`] is reference counted. Topics and registries only keep
//! a [`WeakSubscription`]; once the last caller clone is dropped the handle
//! unsubscribes every identifier it registered, in the background.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::registrar::TopicRegistrar;
use crate::domain::{ContentIdentifier, TokenHash};

struct SubscriptionInner {
    id: Uuid,
    identifier: ContentIdentifier,
    session: Mutex<TokenHash>,
    associated: Mutex<Vec<ContentIdentifier>>,
    registrar: TopicRegistrar,
}

impl Drop for SubscriptionInner {
    fn drop(&mut self) {
        let mut identifiers = vec![self.identifier.clone()];
        identifiers.append(self.associated.get_mut());
        let session = self.session.get_mut().clone();
        let registrar = self.registrar.clone();

        let Ok(runtime) = Handle::try_current() else {
            warn!(
                content_id = %self.identifier,
                "Subscription released outside a runtime, skipping unsubscribe"
            );
            return;
        };

        debug!(content_id = %self.identifier, count = identifiers.len(), "Subscription released");
        runtime.spawn(async move {
            for identifier in &identifiers {
                registrar.unsubscribe(identifier, &session).await;
            }
        });
    }
}

/// Strong handle to a registered topic.
#[derive(Clone)]
pub struct Subscription(Arc<SubscriptionInner>);

impl Subscription {
    pub(crate) fn new(
        identifier: ContentIdentifier,
        session: TokenHash,
        registrar: TopicRegistrar,
    ) -> Self {
        Self(Arc::new(SubscriptionInner {
            id: Uuid::new_v4(),
            identifier,
            session: Mutex::new(session),
            associated: Mutex::new(Vec::new()),
            registrar,
        }))
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    #[must_use]
    pub fn content_identifier(&self) -> &ContentIdentifier {
        &self.0.identifier
    }

    /// Session hash the topic is currently registered under.
    #[must_use]
    pub fn session(&self) -> TokenHash {
        self.0.session.lock().clone()
    }

    /// Main identifier followed by every associated one.
    #[must_use]
    pub fn identifiers(&self) -> Vec<ContentIdentifier> {
        let associated = self.0.associated.lock();
        let mut identifiers = Vec::with_capacity(associated.len() + 1);
        identifiers.push(self.0.identifier.clone());
        identifiers.extend(associated.iter().cloned());
        identifiers
    }

    /// Attach another registered identifier (e.g. a further page) so it is
    /// replayed and released together with this handle.
    pub(crate) fn associate(&self, identifier: ContentIdentifier) {
        let mut associated = self.0.associated.lock();
        if identifier != self.0.identifier && !associated.contains(&identifier) {
            associated.push(identifier);
        }
    }

    pub(crate) fn rebind(&self, session: TokenHash) {
        *self.0.session.lock() = session;
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakSubscription {
        WeakSubscription(Arc::downgrade(&self.0))
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.0.id)
            .field("content_id", &self.0.identifier.key())
            .finish()
    }
}

/// Non-owning reference to a [`Subscription`].
#[derive(Clone, Default)]
pub struct WeakSubscription(Weak<SubscriptionInner>);

impl WeakSubscription {
    #[must_use]
    pub fn upgrade(&self) -> Option<Subscription> {
        self.0.upgrade().map(Subscription)
    }

    /// Whether some caller still owns the handle.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakSubscription")
            .field(&self.is_alive())
            .finish()
    }
}
