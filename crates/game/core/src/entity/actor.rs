use super::{Component, ComponentKind};

/// Identifier of a map instance.
pub type MapId = u16;

/// Pixel coordinates on a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Placement of an entity in the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorComponent {
    pub map: MapId,
    pub position: Position,
    /// Collision radius in pixels.
    pub size: u8,
}

impl ActorComponent {
    pub const CHARACTER_SIZE: u8 = 16;

    pub fn new(map: MapId, position: Position) -> Self {
        Self {
            map,
            position,
            size: Self::CHARACTER_SIZE,
        }
    }
}

impl Component for ActorComponent {
    const KIND: ComponentKind = ComponentKind::Actor;
}
