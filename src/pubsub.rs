use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// A message delivered to a channel subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: String,
    pub payload: Vec<u8>,
}

/// A live subscription feed. Dropping the receiver ends the
/// subscription; the broker prunes the dead sender on the next publish.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) channel: String,
    pub(crate) id: u64,
    rx: mpsc::Receiver<Message>,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next message. None means the subscription was closed
    /// broker-side.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Non-blocking poll for an already-queued message.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

/// Registry of channel subscriptions. Channels are not keys: they carry
/// no expiry, no persistence, and exist only while subscribers do.
#[derive(Debug, Default)]
pub struct Broker {
    next_id: u64,
    channels: HashMap<String, HashMap<u64, mpsc::Sender<Message>>>,
}

impl Broker {
    pub fn new() -> Self {
        Broker::default()
    }

    /// Attach a subscriber with a bounded queue of `capacity` messages.
    pub fn subscribe(&mut self, channel: &str, capacity: usize) -> Subscription {
        let (tx, rx) = mpsc::channel(capacity);
        self.next_id += 1;
        let id = self.next_id;
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(id, tx);
        Subscription {
            channel: channel.to_string(),
            id,
            rx,
        }
    }

    /// Detach a subscriber explicitly.
    pub fn unsubscribe(&mut self, channel: &str, id: u64) {
        if let Some(subs) = self.channels.get_mut(channel) {
            subs.remove(&id);
            if subs.is_empty() {
                self.channels.remove(channel);
            }
        }
    }

    /// Fan a message out to every current subscriber of `channel`.
    ///
    /// Returns the number of subscribers the message was queued to. A
    /// subscriber whose queue is full misses this message (drop-when-full
    /// keeps publishers non-blocking); one whose receiver is gone is
    /// pruned. With no subscribers the message is dropped entirely.
    pub fn publish(&mut self, channel: &str, payload: &[u8]) -> usize {
        let Some(subs) = self.channels.get_mut(channel) else {
            return 0;
        };

        let mut delivered = 0;
        let mut closed: Vec<u64> = Vec::new();
        for (&id, tx) in subs.iter() {
            let msg = Message {
                channel: channel.to_string(),
                payload: payload.to_vec(),
            };
            match tx.try_send(msg) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(channel, subscriber = id, "subscriber queue full, dropping");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(id),
            }
        }
        for id in closed {
            subs.remove(&id);
        }
        if subs.is_empty() {
            self.channels.remove(channel);
        }
        delivered
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |s| s.len())
    }
}

pub type SharedBroker = Arc<RwLock<Broker>>;
