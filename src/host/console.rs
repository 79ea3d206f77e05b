use anyhow::{anyhow, bail, Result};
use chatcore::Message;

const BROADCAST_TARGET: &str = "*";

/// Parses `sender -> recipient: text`, with `*` as recipient for a broadcast.
pub fn parse_line(line: &str) -> Result<Message> {
    let (route, content) = line
        .split_once(':')
        .ok_or_else(|| anyhow!("missing ':' between route and text"))?;
    let (sender, recipient) = route
        .split_once("->")
        .ok_or_else(|| anyhow!("missing '->' between sender and recipient"))?;

    let sender = sender.trim();
    let recipient = recipient.trim();
    let content = content.trim();

    if sender.is_empty() {
        bail!("sender is empty");
    }
    if recipient.is_empty() {
        bail!("recipient is empty");
    }

    if recipient == BROADCAST_TARGET {
        Ok(Message::broadcast(sender, content))
    } else {
        Ok(Message::direct(sender, recipient, content))
    }
}
