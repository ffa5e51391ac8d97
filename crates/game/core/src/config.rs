/// Where a character reappears after death when no script handles the respawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RespawnPoint {
    pub map: u16,
    pub x: i32,
    pub y: i32,
}

impl RespawnPoint {
    pub const fn new(map: u16, x: i32, y: i32) -> Self {
        Self { map, x, y }
    }
}

impl Default for RespawnPoint {
    fn default() -> Self {
        Self::new(
            GameConfig::DEFAULT_RESPAWN_MAP,
            GameConfig::DEFAULT_RESPAWN_X,
            GameConfig::DEFAULT_RESPAWN_Y,
        )
    }
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Default respawn location (`char_respawnMap`, `char_respawnX`, `char_respawnY`).
    pub respawn: RespawnPoint,
}

impl GameConfig {
    // ===== wire constants =====
    /// Attribute values travel as `value × 256` integers.
    pub const FIXED_POINT_SCALE: f64 = 256.0;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_RESPAWN_MAP: u16 = 1;
    pub const DEFAULT_RESPAWN_X: i32 = 1024;
    pub const DEFAULT_RESPAWN_Y: i32 = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_respawn(respawn: RespawnPoint) -> Self {
        Self { respawn }
    }
}
