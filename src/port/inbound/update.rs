use crate::domain::ContentUpdate;

/// Consumer of decoded content updates.
///
/// The socket runtime calls `handle` once per update, in delivery order.
pub trait ContentUpdateHandler: Send + Sync {
    fn handle(&self, update: ContentUpdate);
}
