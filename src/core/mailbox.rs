use tokio::sync::mpsc;

use crate::core::message::Message;

/// Sending half of a subscriber's delivery channel.
///
/// Only [`Mailbox::channel`] creates one and it cannot be cloned, so once it is
/// registered the broker holds the single sender. Dropping it on unregister is what
/// closes the subscriber's receiver.
///
/// ```compile_fail
/// let (mailbox, _rx) = chatcore::Mailbox::channel(1);
/// let kept = mailbox.clone();
/// ```
#[derive(Debug)]
pub struct Mailbox {
    tx: mpsc::Sender<Message>,
}

impl Mailbox {
    /// A zero capacity is bumped to one slot.
    pub fn channel(capacity: usize) -> (Mailbox, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Mailbox { tx }, rx)
    }

    pub(crate) fn sender(&self) -> &mpsc::Sender<Message> {
        &self.tx
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}
