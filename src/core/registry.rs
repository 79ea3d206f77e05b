use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::info;

use crate::core::mailbox::Mailbox;

pub type Subscribers = HashMap<String, Mailbox>;

/// Live mapping from subscriber id to the sending half of its mailbox.
///
/// Each entry owns the only sender of its mailbox: removing an entry drops it,
/// which closes the channel for the subscriber. Removal happens under the write lock,
/// so the dispatch loop (read lock) never sends into a mailbox that is being closed.
#[derive(Debug, Default)]
pub struct Registry {
    subscribers: RwLock<Subscribers>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and keeps the existing mailbox when `id` is already present.
    pub async fn register(&self, id: &str, mailbox: Mailbox) -> bool {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.contains_key(id) {
            info!(subscriber = %id, "already registered, keeping existing mailbox");
            return false;
        }
        subscribers.insert(id.to_string(), mailbox);
        info!(subscriber = %id, "registered");
        true
    }

    /// Returns `false` when `id` was not registered.
    pub async fn unregister(&self, id: &str) -> bool {
        let mut subscribers = self.subscribers.write().await;
        match subscribers.remove(id) {
            Some(mailbox) => {
                drop(mailbox);
                info!(subscriber = %id, "unregistered, mailbox closed");
                true
            }
            None => {
                info!(subscriber = %id, "not found for unregistration");
                false
            }
        }
    }

    /// Consistent view for one message's worth of deliveries.
    pub async fn snapshot(&self) -> RwLockReadGuard<'_, Subscribers> {
        self.subscribers.read().await
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.subscribers.read().await.contains_key(id)
    }
}
