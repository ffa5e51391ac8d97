//! Hooks into the scripting engine.
//!
//! The core only relies on the synchronous call/return contract: a callback
//! runs to completion before the operation that invoked it continues.
//! Callbacks receive the character's [`Entity`], never the character itself,
//! so they cannot start or end transactions from inside a callback.

use std::fmt;
use std::sync::Arc;

use crate::entity::Entity;

pub type EntityCallback = Arc<dyn Fn(&mut Entity) + Send + Sync>;

/// Returns `true` when the script fully handled the event.
pub type HandledCallback = Arc<dyn Fn(&mut Entity) -> bool + Send + Sync>;

/// Character callbacks, registered once and shared by every character.
#[derive(Clone, Default)]
pub struct ScriptCallbacks {
    on_death: Option<EntityCallback>,
    on_death_accepted: Option<HandledCallback>,
    on_login: Option<EntityCallback>,
}

impl ScriptCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_death(mut self, callback: impl Fn(&mut Entity) + Send + Sync + 'static) -> Self {
        self.on_death = Some(Arc::new(callback));
        self
    }

    pub fn with_death_accepted(
        mut self,
        callback: impl Fn(&mut Entity) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.on_death_accepted = Some(Arc::new(callback));
        self
    }

    pub fn with_login(mut self, callback: impl Fn(&mut Entity) + Send + Sync + 'static) -> Self {
        self.on_login = Some(Arc::new(callback));
        self
    }

    /// Fire-and-forget. Returns whether a callback was registered.
    pub fn death(&self, entity: &mut Entity) -> bool {
        Self::notify(self.on_death.as_ref(), entity)
    }

    /// `true` only if a callback is registered and it handled the respawn.
    pub fn death_accepted(&self, entity: &mut Entity) -> bool {
        self.on_death_accepted
            .as_ref()
            .is_some_and(|callback| callback(entity))
    }

    pub fn login(&self, entity: &mut Entity) -> bool {
        Self::notify(self.on_login.as_ref(), entity)
    }

    fn notify(callback: Option<&EntityCallback>, entity: &mut Entity) -> bool {
        match callback {
            Some(callback) => {
                callback(entity);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ScriptCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptCallbacks")
            .field("on_death", &self.on_death.is_some())
            .field("on_death_accepted", &self.on_death_accepted.is_some())
            .field("on_login", &self.on_login.is_some())
            .finish()
    }
}

/// Where a suspended script thread stands after being resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadStatus {
    /// Waiting for more input from the player.
    Suspended,
    Finished,
}

/// A suspendable script execution, such as an NPC dialogue.
pub trait ScriptThread: Send {
    /// Runs until the thread needs input or terminates.
    fn resume(&mut self, entity: &mut Entity) -> ThreadStatus;
}
