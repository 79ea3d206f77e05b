use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::BrokerConfig;
use crate::core::bounded_send::{send_bounded, SendOutcome};
use crate::core::dispatch::Dispatcher;
use crate::core::error::BrokerError;
use crate::core::message::Message;
use crate::core::mailbox::Mailbox;
use crate::core::registry::Registry;
use crate::core::shutdown::ShutdownSignal;
use crate::core::stats::{BrokerStats, StatsSnapshot};
use crate::broker_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    Created = 0,
    Running = 1,
    ShuttingDown = 2,
    Stopped = 3,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Created,
            1 => LifecycleState::Running,
            2 => LifecycleState::ShuttingDown,
            _ => LifecycleState::Stopped,
        }
    }
}

/// In-process message broker.
///
/// Producers `submit` into one bounded inbound queue; a single dispatch task drains it
/// and fans each message out to registered mailboxes, waiting at most
/// `delivery_timeout` per mailbox. A slow subscriber loses messages instead of
/// stalling everyone else, so broadcasts may reach only part of the registry.
pub struct Broker {
    config: BrokerConfig,
    shutdown: ShutdownSignal,
    state: AtomicU8,
    inbound: RwLock<Option<mpsc::Sender<Message>>>,
    // held until `start` hands it to the dispatch task
    pending_inbound: Mutex<Option<mpsc::Receiver<Message>>>,
    dispatch_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_gate: tokio::sync::Mutex<()>,
    registry: Arc<Registry>,
    stats: Arc<BrokerStats>,
}

impl Broker {
    /// Builds a broker with the process-wide config, scoped under `parent`.
    pub fn new(parent: &ShutdownSignal) -> Self {
        Self::with_config(parent, broker_config().clone())
    }

    pub fn with_config(parent: &ShutdownSignal, config: BrokerConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            config,
            shutdown: parent.child(),
            state: AtomicU8::new(LifecycleState::Created as u8),
            inbound: RwLock::new(Some(tx)),
            pending_inbound: Mutex::new(Some(rx)),
            dispatch_task: Mutex::new(None),
            shutdown_gate: tokio::sync::Mutex::new(()),
            registry: Arc::new(Registry::new()),
            stats: Arc::new(BrokerStats::default()),
        }
    }

    /// Spawns the dispatch loop. Must be called from inside a tokio runtime.
    pub fn start(&self) -> Result<(), BrokerError> {
        let mut task = lock(&self.dispatch_task);

        if self.shutdown.is_triggered() {
            return Err(BrokerError::BrokerShutDown);
        }
        if let Err(current) = self.state.compare_exchange(
            LifecycleState::Created as u8,
            LifecycleState::Running as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            return match LifecycleState::from_u8(current) {
                LifecycleState::Running => Err(BrokerError::AlreadyStarted),
                _ => Err(BrokerError::BrokerShutDown),
            };
        }

        let inbound = lock(&self.pending_inbound)
            .take()
            .ok_or(BrokerError::AlreadyStarted)?;

        let dispatcher = Dispatcher {
            registry: Arc::clone(&self.registry),
            stats: Arc::clone(&self.stats),
            shutdown: self.shutdown.clone(),
            delivery_timeout: self.config.delivery_timeout(),
        };
        *task = Some(tokio::spawn(dispatcher.run(inbound)));

        info!(
            queue_capacity = self.config.queue_capacity,
            delivery_timeout = ?self.config.delivery_timeout(),
            "broker started"
        );
        Ok(())
    }

    /// Enqueues `message` for dispatch.
    ///
    /// Waits at most `submit_timeout` for room in the inbound queue. Routing problems
    /// (unknown recipient, slow subscriber) are not reported here.
    pub async fn submit(&self, message: Message) -> Result<(), BrokerError> {
        if message.sender.is_empty() {
            return Err(BrokerError::EmptySender);
        }

        let inbound = self
            .inbound
            .read()
            .await
            .clone()
            .ok_or(BrokerError::BrokerShutDown)?;

        let wait = self.config.submit_timeout();
        match send_bounded(&inbound, message, wait, &self.shutdown).await {
            SendOutcome::Delivered => {
                self.stats.record_submitted();
                Ok(())
            }
            SendOutcome::TimedOut => Err(BrokerError::SubmissionTimeout(wait)),
            SendOutcome::Cancelled | SendOutcome::Closed => Err(BrokerError::BrokerShutDown),
        }
    }

    /// Adds `id` with its mailbox. The broker takes the sender over; a second
    /// registration of the same id is ignored and its mailbox dropped.
    pub async fn register(&self, id: &str, mailbox: Mailbox) -> bool {
        self.registry.register(id, mailbox).await
    }

    /// Removes `id` and closes its mailbox.
    pub async fn unregister(&self, id: &str) -> bool {
        self.registry.unregister(id).await
    }

    pub async fn is_registered(&self, id: &str) -> bool {
        self.registry.contains(id).await
    }

    pub async fn subscriber_count(&self) -> usize {
        self.registry.len().await
    }

    /// Cancels the dispatch loop, waits for it to exit, then closes the inbound queue.
    ///
    /// Safe to call repeatedly and concurrently; later callers return once the first
    /// one is done.
    pub async fn shutdown(&self) {
        let _gate = self.shutdown_gate.lock().await;
        if self.state() == LifecycleState::Stopped {
            debug!("broker already shut down");
            return;
        }

        info!("Initiating shutdown...");
        self.state.store(LifecycleState::ShuttingDown as u8, Ordering::SeqCst);
        self.shutdown.trigger();

        let task = lock(&self.dispatch_task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("dispatch loop terminated abnormally: {:?}", e);
            }
        }

        self.inbound.write().await.take();
        lock(&self.pending_inbound).take();

        self.state.store(LifecycleState::Stopped as u8, Ordering::SeqCst);
        info!("Shutdown complete.");
    }

    /// A broker whose scope fired from outside reports `ShuttingDown` until `shutdown`
    /// has run.
    pub fn state(&self) -> LifecycleState {
        match LifecycleState::from_u8(self.state.load(Ordering::SeqCst)) {
            LifecycleState::Created | LifecycleState::Running if self.shutdown.is_triggered() => {
                LifecycleState::ShuttingDown
            }
            state => state,
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        // a broker dropped without shutdown must not leave its dispatch task behind
        self.shutdown.trigger();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn quick_config() -> BrokerConfig {
        BrokerConfig {
            queue_capacity: 4,
            submit_timeout_ms: 50,
            delivery_timeout_ms: 20,
        }
    }

    #[tokio::test]
    async fn lifecycle_walks_through_every_state() {
        let broker = Broker::with_config(&ShutdownSignal::new(), quick_config());
        assert_eq!(broker.state(), LifecycleState::Created);

        broker.start().unwrap();
        assert_eq!(broker.state(), LifecycleState::Running);
        assert_eq!(broker.start(), Err(BrokerError::AlreadyStarted));

        broker.shutdown().await;
        assert_eq!(broker.state(), LifecycleState::Stopped);
        assert_eq!(broker.start(), Err(BrokerError::BrokerShutDown));
    }

    #[tokio::test]
    async fn start_refuses_once_parent_fired() {
        let root = ShutdownSignal::new();
        let broker = Broker::with_config(&root, quick_config());
        root.trigger();

        assert_eq!(broker.state(), LifecycleState::ShuttingDown);
        assert_eq!(broker.start(), Err(BrokerError::BrokerShutDown));

        broker.shutdown().await;
        assert_eq!(broker.state(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn parent_firing_after_start_is_visible_in_state() {
        let root = ShutdownSignal::new();
        let broker = Broker::with_config(&root, quick_config());
        broker.start().unwrap();

        root.trigger();
        assert_eq!(broker.state(), LifecycleState::ShuttingDown);
        broker.shutdown().await;
    }

    #[tokio::test]
    async fn empty_sender_is_rejected_at_submit() {
        let broker = Broker::with_config(&ShutdownSignal::new(), quick_config());
        let err = broker
            .submit(Message::direct("", "bob", "who am i"))
            .await
            .unwrap_err();
        assert_eq!(err, BrokerError::EmptySender);
        assert_eq!(broker.stats().submitted, 0);
    }

    #[tokio::test]
    async fn messages_submitted_before_start_are_dispatched() {
        let broker = Broker::with_config(&ShutdownSignal::new(), quick_config());
        let (mailbox, mut rx) = Mailbox::channel(4);
        broker.register("bob", mailbox).await;

        broker.submit(Message::direct("alice", "bob", "early")).await.unwrap();
        broker.start().unwrap();

        let got = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out")
            .expect("mailbox closed");
        assert_eq!(got.content, "early");
        broker.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_without_start_stops_cleanly() {
        let broker = Broker::with_config(&ShutdownSignal::new(), quick_config());
        broker.shutdown().await;
        assert_eq!(broker.state(), LifecycleState::Stopped);
        assert_eq!(
            broker.submit(Message::broadcast("alice", "late")).await,
            Err(BrokerError::BrokerShutDown)
        );
    }
}
