//! Collaborators the simulation core talks to but does not implement.
//!
//! The core calls these synchronously from within a tick and expects them to
//! return promptly; queueing, I/O and retries are the implementor's business.

use crate::attribute::AttributeId;
use crate::entity::{EntityId, MapId, Position};
use crate::sync::MessageOut;

/// The owning client connection of a character.
pub trait ClientSink: Send {
    fn send(&mut self, message: MessageOut);
}

/// Persistence side of attribute changes.
pub trait AccountNotifier: Send + Sync {
    fn update_attribute(&self, database_id: i32, attribute: AttributeId, base: f64, modified: f64);
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAccountNotifier;

impl AccountNotifier for NullAccountNotifier {
    fn update_attribute(&self, _: i32, _: AttributeId, _: f64, _: f64) {}
}

/// World-level effects that must wait until the current tick has finished.
pub trait WorldEffects {
    fn enqueue_warp(&mut self, entity: EntityId, map: MapId, position: Position);

    fn enqueue_removal(&mut self, entity: EntityId);
}
