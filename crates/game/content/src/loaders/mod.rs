//! Content loaders for reading game data from files.
//!
//! Registries are read from RON, server configuration from TOML. Each loader
//! parses into a file-format struct first and converts it into the game-core
//! type, so data files use plain numbers where game-core uses newtypes.

pub mod abilities;
pub mod attributes;
pub mod config;
pub mod factory;

pub use abilities::AbilityLoader;
pub use attributes::AttributeLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
