use std::time::Duration;
use tokio::sync::mpsc;

use crate::core::shutdown::ShutdownSignal;

/// What happened to a value handed to [`send_bounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    TimedOut,
    Cancelled,
    Closed,
}

/// Push `value` into a bounded channel, giving up after `wait` or as soon as
/// `shutdown` fires. Cancellation wins over a free slot.
///
/// Shared by the submit path (inbound queue) and the dispatch fan-out
/// (subscriber channels).
pub async fn send_bounded<T>(
    tx: &mpsc::Sender<T>,
    value: T,
    wait: Duration,
    shutdown: &ShutdownSignal,
) -> SendOutcome {
    tokio::select! {
        biased;

        _ = shutdown.triggered() => SendOutcome::Cancelled,

        res = tokio::time::timeout(wait, tx.send(value)) => match res {
            Ok(Ok(())) => SendOutcome::Delivered,
            Ok(Err(_)) => SendOutcome::Closed,
            Err(_) => SendOutcome::TimedOut,
        },
    }
}
