//! Game configuration loader.

use std::path::Path;

use game_core::{GameConfig, RespawnPoint};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Server configuration keys as they appear in the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigToml {
    #[serde(rename = "char_respawnMap", default = "default_respawn_map")]
    pub respawn_map: u16,
    #[serde(rename = "char_respawnX", default = "default_respawn_x")]
    pub respawn_x: i32,
    #[serde(rename = "char_respawnY", default = "default_respawn_y")]
    pub respawn_y: i32,
}

impl Default for ConfigToml {
    fn default() -> Self {
        Self {
            respawn_map: default_respawn_map(),
            respawn_x: default_respawn_x(),
            respawn_y: default_respawn_y(),
        }
    }
}

fn default_respawn_map() -> u16 {
    GameConfig::DEFAULT_RESPAWN_MAP
}

fn default_respawn_x() -> i32 {
    GameConfig::DEFAULT_RESPAWN_X
}

fn default_respawn_y() -> i32 {
    GameConfig::DEFAULT_RESPAWN_Y
}

impl From<ConfigToml> for GameConfig {
    fn from(config: ConfigToml) -> Self {
        GameConfig::with_respawn(RespawnPoint::new(
            config.respawn_map,
            config.respawn_x,
            config.respawn_y,
        ))
    }
}

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: ConfigToml = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ConfigLoader::parse("").unwrap();
        assert_eq!(config.respawn, RespawnPoint::new(1, 1024, 1024));
    }

    #[test]
    fn respawn_keys_override_defaults() {
        let config = ConfigLoader::parse(
            r#"
            char_respawnMap = 3
            char_respawnY = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.respawn, RespawnPoint::new(3, 1024, 64));
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(ConfigLoader::parse("char_respawnMap = \"town\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "char_respawnX = 10\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.respawn.x, 10);
        assert!(ConfigLoader::load(&dir.path().join("missing.toml")).is_err());
    }
}
