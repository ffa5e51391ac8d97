//! Content factory for building registries from data files.

use std::path::{Path, PathBuf};

use game_core::{AbilityCatalog, AttributeRegistry, GameConfig};

use crate::loaders::{AbilityLoader, AttributeLoader, ConfigLoader, LoadResult};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── attributes.ron
/// └── abilities.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`; defaults if the file is
    /// absent.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the attribute registry from `attributes.ron`.
    pub fn load_attributes(&self) -> LoadResult<AttributeRegistry> {
        AttributeLoader::load(&self.data_dir.join("attributes.ron"))
    }

    /// Load the ability catalog from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<AbilityCatalog> {
        AbilityLoader::load(&self.data_dir.join("abilities.ron"))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
