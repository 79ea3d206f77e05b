use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use crate::core::bounded_send::{send_bounded, SendOutcome};
use crate::core::error::DeliveryError;
use crate::core::mailbox::Mailbox;
use crate::core::message::Message;
use crate::core::registry::Registry;
use crate::core::shutdown::ShutdownSignal;
use crate::core::stats::BrokerStats;

/// The single consumer of the inbound queue and the only writer into mailboxes.
pub(crate) struct Dispatcher {
    pub(crate) registry: Arc<Registry>,
    pub(crate) stats: Arc<BrokerStats>,
    pub(crate) shutdown: ShutdownSignal,
    pub(crate) delivery_timeout: Duration,
}

impl Dispatcher {
    pub(crate) async fn run(self, mut inbound: Receiver<Message>) {
        info!("dispatch loop started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.triggered() => {
                    info!("Shutdown signal received. Stopping dispatch loop...");
                    break;
                }

                next = inbound.recv() => match next {
                    Some(message) => {
                        if self.dispatch(&message).await.is_break() {
                            info!("Shutdown signal received mid-delivery. Stopping...");
                            break;
                        }
                    }
                    None => {
                        debug!("inbound queue closed");
                        break;
                    }
                },
            }
        }

        info!("dispatch loop exited");
    }

    /// Delivers one message. Breaks only when shutdown interrupts a send.
    async fn dispatch(&self, message: &Message) -> ControlFlow<()> {
        let subscribers = self.registry.snapshot().await;

        if message.broadcast {
            debug!(sender = %message.sender, targets = subscribers.len(), "broadcasting");
            for (id, mailbox) in subscribers.iter() {
                if self.deliver(id, mailbox, message.clone()).await.is_break() {
                    return ControlFlow::Break(());
                }
            }
        } else {
            match subscribers.get(&message.recipient) {
                Some(mailbox) => {
                    debug!(
                        sender = %message.sender,
                        recipient = %message.recipient,
                        "direct message"
                    );
                    return self.deliver(&message.recipient, mailbox, message.clone()).await;
                }
                None => {
                    let recipient = message.recipient.clone();
                    self.record_drop(DeliveryError::RecipientNotFound(recipient));
                }
            }
        }

        ControlFlow::Continue(())
    }

    async fn deliver(&self, id: &str, mailbox: &Mailbox, message: Message) -> ControlFlow<()> {
        let outcome =
            send_bounded(mailbox.sender(), message, self.delivery_timeout, &self.shutdown).await;
        match outcome {
            SendOutcome::Delivered => self.stats.record_delivered(),
            SendOutcome::TimedOut => self.record_drop(DeliveryError::DeliveryTimeout {
                subscriber: id.to_string(),
                waited: self.delivery_timeout,
            }),
            SendOutcome::Closed => {
                self.record_drop(DeliveryError::SubscriberClosed(id.to_string()))
            }
            SendOutcome::Cancelled => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn record_drop(&self, reason: DeliveryError) {
        warn!(error = %reason, "message dropped");
        self.stats.record_drop(&reason);
    }
}
