#![allow(dead_code)]

use std::time::Duration;

use chatcore::{Broker, BrokerConfig, Mailbox, Message, ShutdownSignal, StatsSnapshot};
use tokio::sync::mpsc::Receiver;

pub const FIXED_TS: i64 = 1_700_000_000_000;

pub fn fast_config() -> BrokerConfig {
    BrokerConfig {
        queue_capacity: 16,
        submit_timeout_ms: 100,
        delivery_timeout_ms: 50,
    }
}

pub fn started_broker(config: BrokerConfig) -> (ShutdownSignal, Broker) {
    let root = ShutdownSignal::new();
    let broker = Broker::with_config(&root, config);
    broker.start().expect("start failed");
    (root, broker)
}

pub async fn subscribe(broker: &Broker, id: &str, capacity: usize) -> Receiver<Message> {
    let (mailbox, rx) = Mailbox::channel(capacity);
    assert!(broker.register(id, mailbox).await, "{} was already registered", id);
    rx
}

/// Registers `id` with a one-slot mailbox, fills it through a running broker and
/// never drains it.
pub async fn subscribe_stalled(broker: &Broker, id: &str) -> Receiver<Message> {
    let rx = subscribe(broker, id, 1).await;
    let delivered = broker.stats().delivered;
    broker
        .submit(Message::new("filler", id, "", false, 0))
        .await
        .expect("filler submit failed");
    wait_for_stats(broker, |s| s.delivered == delivered + 1).await;
    rx
}

pub async fn recv_within(rx: &mut Receiver<Message>, wait: Duration) -> Option<Message> {
    tokio::time::timeout(wait, rx.recv()).await.ok().flatten()
}

pub async fn expect_message(rx: &mut Receiver<Message>) -> Message {
    recv_within(rx, Duration::from_secs(1))
        .await
        .expect("no message arrived within 1s")
}

pub async fn assert_nothing_arrives(rx: &mut Receiver<Message>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err(), "unexpected message in mailbox");
}

/// Polls the broker counters until `check` passes or a second elapses.
pub async fn wait_for_stats(
    broker: &Broker,
    check: impl Fn(&StatsSnapshot) -> bool,
) -> StatsSnapshot {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    loop {
        let stats = broker.stats();
        if check(&stats) {
            return stats;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("stats never reached expected state: {:?}", stats);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
