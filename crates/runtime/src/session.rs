//! Channel-backed collaborators for hosting characters inside tokio.
//!
//! The simulation calls its collaborators synchronously, so both adapters
//! use `try_send` and drop what does not fit instead of blocking the tick.

use tokio::sync::mpsc;
use tracing::warn;

use game_core::{AccountNotifier, AttributeId, ClientSink, MessageOut};

/// Forwards a character's outbound messages to its connection task.
pub struct ChannelClient {
    sender: mpsc::Sender<MessageOut>,
}

impl ChannelClient {
    pub fn new(sender: mpsc::Sender<MessageOut>) -> Self {
        Self { sender }
    }

    /// A client paired with the receiver its connection task reads from.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MessageOut>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

impl ClientSink for ChannelClient {
    fn send(&mut self, message: MessageOut) {
        if let Err(error) = self.sender.try_send(message) {
            warn!(%error, "dropping outbound message");
        }
    }
}

/// One persisted attribute change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeUpdate {
    pub database_id: i32,
    pub attribute: AttributeId,
    pub base: f64,
    pub modified: f64,
}

/// Forwards attribute changes to the account server link.
pub struct ChannelAccounts {
    sender: mpsc::Sender<AttributeUpdate>,
}

impl ChannelAccounts {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AttributeUpdate>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl AccountNotifier for ChannelAccounts {
    fn update_attribute(&self, database_id: i32, attribute: AttributeId, base: f64, modified: f64) {
        let update = AttributeUpdate {
            database_id,
            attribute,
            base,
            modified,
        };
        if let Err(error) = self.sender.try_send(update) {
            warn!(%error, database_id, %attribute, "dropping attribute update");
        }
    }
}
