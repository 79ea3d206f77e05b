pub mod core;
mod config;

use std::sync::OnceLock;

pub use config::BrokerConfig;
pub use crate::core::{
    Broker, BrokerError, DeliveryError, LifecycleState, Mailbox, Message, SendOutcome,
    ShutdownSignal, StatsSnapshot,
};

/// is Filled by `main()` **once**; thereafter read-only everywhere.
pub static BROKER_CONFIG: OnceLock<BrokerConfig> = OnceLock::new();

/// Convenience accessor used by `Broker::new`.
pub fn broker_config() -> &'static BrokerConfig {
    BROKER_CONFIG.get_or_init(BrokerConfig::default)
}
