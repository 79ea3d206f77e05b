use std::time::Duration;
use thiserror::Error;

/// Errors handed back to producers and lifecycle callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("Broker is shut down")]
    BrokerShutDown,

    #[error("Inbound queue stayed full for {0:?}")]
    SubmissionTimeout(Duration),

    #[error("Message has an empty sender")]
    EmptySender,

    #[error("Broker was already started")]
    AlreadyStarted,
}

/// Reasons a message was not delivered to a subscriber.
///
/// These never reach the producer. The dispatch loop logs them and bumps the
/// matching counter in `BrokerStats`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Recipient {0} not found")]
    RecipientNotFound(String),

    #[error("Subscriber {subscriber} did not accept the message within {waited:?}")]
    DeliveryTimeout { subscriber: String, waited: Duration },

    #[error("Subscriber {0} dropped its receiver")]
    SubscriberClosed(String),
}
