use serde::{Deserialize, Serialize};

/// A chat message as it travels through the broker. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub recipient: String, // ignored when `broadcast` is set
    pub content: String,
    pub broadcast: bool,
    pub timestamp: i64, // Unix epoch in millis, set by the producer
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
        broadcast: bool,
        timestamp: i64,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            broadcast,
            timestamp,
        }
    }

    pub fn direct(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sender, recipient, content, false, now_millis())
    }

    pub fn broadcast(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(sender, String::new(), content, true, now_millis())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
