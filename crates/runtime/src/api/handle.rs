//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! logging characters in and out while the worker keeps ticking.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{ClientSink, Disconnect, EntityId};

use super::errors::{Result, RuntimeError};
use super::events::{CharacterStatus, RuntimeEvent};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    events: broadcast::Sender<RuntimeEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        events: broadcast::Sender<RuntimeEvent>,
    ) -> Self {
        Self { command_tx, events }
    }

    /// Admit a character from its login payload.
    pub async fn login(
        &self,
        payload: Vec<u8>,
        client: Option<Box<dyn ClientSink>>,
    ) -> Result<EntityId> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Login {
                payload,
                client,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Report that the client of `entity` went away.
    pub async fn disconnect(&self, entity: EntityId) -> Result<Disconnect> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Disconnect {
                entity,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Inflict damage on a character, for scripted hazards and tests.
    pub async fn damage(&self, entity: EntityId, amount: f64) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Damage {
                entity,
                amount,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Revive a dead character. The warp to the respawn point lands on the
    /// next tick.
    pub async fn respawn(&self, entity: EntityId) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Respawn {
                entity,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Query a character's status; `None` once it has left the simulation.
    pub async fn status(&self, entity: EntityId) -> Result<Option<CharacterStatus>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Status {
                entity,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.events.subscribe()
    }
}
