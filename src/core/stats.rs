use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::error::DeliveryError;

/// Running counters for the broker. Every drop condition bumps exactly one of them.
#[derive(Debug, Default)]
pub struct BrokerStats {
    submitted: AtomicU64,
    delivered: AtomicU64,
    dropped_timeout: AtomicU64,
    dropped_closed: AtomicU64,
    recipient_not_found: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub delivered: u64,
    pub dropped_timeout: u64,
    pub dropped_closed: u64,
    pub recipient_not_found: u64,
}

impl StatsSnapshot {
    pub fn dropped(&self) -> u64 {
        self.dropped_timeout + self.dropped_closed + self.recipient_not_found
    }
}

impl BrokerStats {
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self, reason: &DeliveryError) {
        let counter = match reason {
            DeliveryError::RecipientNotFound(_) => &self.recipient_not_found,
            DeliveryError::DeliveryTimeout { .. } => &self.dropped_timeout,
            DeliveryError::SubscriberClosed(_) => &self.dropped_closed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped_timeout: self.dropped_timeout.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            recipient_not_found: self.recipient_not_found.load(Ordering::Relaxed),
        }
    }
}
