pub mod bounded_send;
mod broker;
mod dispatch;
mod error;
pub mod mailbox;
pub mod message;
pub mod registry;
pub mod shutdown;
mod stats;

pub use bounded_send::{send_bounded, SendOutcome};
pub use broker::{Broker, LifecycleState};
pub use error::{BrokerError, DeliveryError};
pub use mailbox::Mailbox;
pub use message::Message;
pub use shutdown::ShutdownSignal;
pub use stats::{BrokerStats, StatsSnapshot};
