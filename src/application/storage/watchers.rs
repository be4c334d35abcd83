use std::collections::HashMap;
use std::hash::Hash;

use tokio::sync::watch;

/// Per-key change notifiers. Senders with no receivers left are dropped on
/// the next refresh.
pub(super) struct Watchers<K, V> {
    senders: HashMap<K, watch::Sender<Option<V>>>,
}

impl<K: Eq + Hash, V: Clone + PartialEq> Watchers<K, V> {
    pub(super) fn new() -> Self {
        Self {
            senders: HashMap::new(),
        }
    }

    pub(super) fn watch(&mut self, key: K, current: Option<V>) -> watch::Receiver<Option<V>> {
        self.senders
            .entry(key)
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    /// Push the current value of every watched key, notifying only keys
    /// whose value actually changed.
    pub(super) fn refresh(&mut self, lookup: impl Fn(&K) -> Option<V>) {
        self.senders.retain(|key, sender| {
            if sender.receiver_count() == 0 {
                return false;
            }
            let value = lookup(key);
            sender.send_if_modified(|current| {
                if *current == value {
                    return false;
                }
                *current = value;
                true
            });
            true
        });
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.senders.len()
    }
}
