//! Events broadcast by the simulation worker.
use game_core::{Disconnect, EntityId, LifecycleState, MapId, Position};

#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeEvent {
    LoggedIn {
        entity: EntityId,
        database_id: i32,
    },
    Disconnected {
        entity: EntityId,
        outcome: Disconnect,
    },
    /// The character left the simulation; `map` and `position` are where it
    /// should be persisted.
    Removed {
        entity: EntityId,
        database_id: i32,
        map: MapId,
        position: Position,
    },
}

/// Read-only view of a character, for hosts and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterStatus {
    pub entity: EntityId,
    pub database_id: i32,
    pub name: String,
    pub lifecycle: LifecycleState,
    pub map: MapId,
    pub position: Position,
    pub attribute_points: u32,
    pub correction_points: u32,
}
