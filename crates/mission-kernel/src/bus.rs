//! Store-and-forward message bus with per-recipient inboxes.
//!
//! ```text
//! send(Agent(id))  ─► inbox[id] (mpsc)        ─┐
//!                                               ├─► retrieve(id): merged by sequence
//! broadcast()      ─► broadcast log + cursor[id]┘
//!        └────────────► history (append-only, every message ever sent)
//! ```
//!
//! Direct messages wait in the recipient's channel until it retrieves them.
//! Broadcasts are appended once to a shared log; every recipient keeps its
//! own cursor into that log, so a broadcast reaches each recipient exactly
//! once no matter which of them retrieves first.
//!
//! The broadcast log is kept for the lifetime of the bus, like the history:
//! a recipient that first appears late still receives every earlier
//! broadcast on its first `retrieve`.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::messages::{AgentId, Message, Payload, Recipient};

/// One recipient's mailbox.
struct Inbox {
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    /// Index of the first broadcast this recipient has not yet seen.
    broadcast_cursor: usize,
}

impl Inbox {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            broadcast_cursor: 0,
        }
    }
}

/// Mailbox-style bus keyed by recipient identity.
///
/// Never blocks and never drops a message: pending messages stay queued
/// until their recipient calls [`retrieve`](Self::retrieve).
pub struct MessageBus {
    inboxes: HashMap<AgentId, Inbox>,
    broadcasts: Vec<Message>,
    history: Vec<Message>,
    next_sequence: u64,
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("inboxes", &self.inboxes.len())
            .field("broadcasts", &self.broadcasts.len())
            .field("history", &self.history.len())
            .finish()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            inboxes: HashMap::new(),
            broadcasts: Vec::new(),
            history: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Open an inbox for `id`. Idempotent.
    ///
    /// Sending to or retrieving for an unregistered id opens its inbox
    /// implicitly; registering up front only makes the recipient known.
    /// Returns `false` for the reserved broadcast name, which never gets an
    /// inbox of its own.
    pub fn register(&mut self, id: &AgentId) -> bool {
        if id.is_broadcast() {
            warn!(agent = %id, "Refusing to register reserved broadcast name");
            return false;
        }
        self.inboxes.entry(id.clone()).or_insert_with(Inbox::new);
        true
    }

    /// Queue a message for `recipient` and record it in history.
    ///
    /// Addressing the reserved name `ALL` is the same as broadcasting.
    pub fn send(
        &mut self,
        sender: &AgentId,
        recipient: impl Into<Recipient>,
        payload: Payload,
    ) -> Message {
        let recipient = match recipient.into() {
            Recipient::Agent(id) => Recipient::from(id),
            Recipient::All => Recipient::All,
        };
        let message = Message {
            id: Uuid::new_v4(),
            sequence: self.next_sequence,
            sender: sender.clone(),
            recipient,
            payload,
            timestamp: Utc::now(),
        };
        self.next_sequence += 1;

        match &message.recipient {
            Recipient::Agent(id) => {
                let inbox = self.inboxes.entry(id.clone()).or_insert_with(Inbox::new);
                let _ = inbox.tx.send(message.clone());
            }
            Recipient::All => self.broadcasts.push(message.clone()),
        }

        trace!(
            sequence = message.sequence,
            sender = %message.sender,
            recipient = %message.recipient,
            message_type = %message.message_type(),
            "Message queued"
        );

        self.history.push(message.clone());
        message
    }

    /// Send `payload` to every recipient.
    pub fn broadcast(&mut self, sender: &AgentId, payload: Payload) -> Message {
        self.send(sender, Recipient::All, payload)
    }

    /// Take every pending message for `recipient`, in send order.
    ///
    /// Returns direct messages plus broadcasts this recipient has not seen.
    /// Only this recipient's pending set shrinks.
    pub fn retrieve(&mut self, recipient: &AgentId) -> Vec<Message> {
        let inbox = self
            .inboxes
            .entry(recipient.clone())
            .or_insert_with(Inbox::new);

        let mut delivered = Vec::new();
        while let Ok(message) = inbox.rx.try_recv() {
            delivered.push(message);
        }

        let unseen = &self.broadcasts[inbox.broadcast_cursor..];
        delivered.extend(unseen.iter().cloned());
        inbox.broadcast_cursor = self.broadcasts.len();

        delivered.sort_by_key(|message| message.sequence);
        delivered
    }

    /// Number of messages `recipient` would receive from `retrieve` now.
    pub fn pending_count(&self, recipient: &AgentId) -> usize {
        match self.inboxes.get(recipient) {
            Some(inbox) => inbox.rx.len() + (self.broadcasts.len() - inbox.broadcast_cursor),
            None => self.broadcasts.len(),
        }
    }

    /// The most recent `limit` messages ever sent, oldest first; all when `None`.
    pub fn history(&self, limit: Option<usize>) -> &[Message] {
        match limit {
            Some(limit) => &self.history[self.history.len().saturating_sub(limit)..],
            None => &self.history,
        }
    }

    /// Total number of messages ever sent.
    pub fn total_sent(&self) -> usize {
        self.history.len()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
