/*
Demo host around the broker.

Owns the root shutdown scope and the subscriber mailboxes, turns console lines into
submissions, and tears everything down on EOF or Ctrl-C.
*/
pub(crate) mod console;
pub(crate) mod params;

use anyhow::{Context, Result};
use chatcore::{Broker, BrokerError, Mailbox, Message, ShutdownSignal};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::host::params::Params;

pub async fn run(params: Params) -> Result<()> {
    let root = ShutdownSignal::new();
    let broker = Broker::new(&root);
    broker.start().context("starting broker")?;

    let mut printers = Vec::with_capacity(params.users.len());
    for user in &params.users {
        let (mailbox, rx) = Mailbox::channel(params.mailbox_capacity);
        if broker.register(user, mailbox).await {
            printers.push(spawn_printer(user.clone(), rx));
        }
    }
    info!(
        users = ?params.users,
        queue_capacity = broker.config().queue_capacity,
        "ready, type `sender -> recipient: text` or `sender -> *: text`"
    );

    tokio::select! {
        res = read_console(&broker) => res?,
        _ = tokio::signal::ctrl_c() => info!("Ctrl-C received"),
    }

    root.trigger();
    broker.shutdown().await;
    for user in &params.users {
        broker.unregister(user).await;
    }
    for printer in printers {
        if let Err(e) = printer.await {
            error!("printer task failed: {:?}", e);
        }
    }
    Ok(())
}

async fn read_console(broker: &Broker) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let message = match console::parse_line(&line) {
            Ok(m) => m,
            Err(e) => {
                warn!("ignoring line: {}", e);
                continue;
            }
        };
        match broker.submit(message).await {
            Ok(()) => debug!("message queued"),
            Err(e @ BrokerError::SubmissionTimeout(_)) => warn!("{}", e),
            Err(e) => return Err(e).context("submitting message"),
        }
    }
    debug!("stdin closed");
    Ok(())
}

fn spawn_printer(user: String, mut mailbox: mpsc::Receiver<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = mailbox.recv().await {
            let kind = if msg.broadcast { "broadcast" } else { "direct" };
            println!("[{}] {} from {}: {}", user, kind, msg.sender, msg.content);
        }
        debug!(subscriber = %user, "mailbox closed");
    })
}
