//! Ability catalog loader.

use std::path::Path;
use std::time::Duration;

use game_core::{AbilityCatalog, AbilityId, AbilityInfo};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCatalogRon {
    #[serde(default = "default_global_cooldown_ms")]
    pub global_cooldown_ms: u64,
    pub abilities: Vec<AbilityRon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityRon {
    pub id: u8,
    pub name: String,
    pub recharge_ms: u64,
}

fn default_global_cooldown_ms() -> u64 {
    AbilityCatalog::DEFAULT_GLOBAL_COOLDOWN.as_millis() as u64
}

/// Loader for the ability catalog from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path) -> LoadResult<AbilityCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<AbilityCatalog> {
        let catalog: AbilityCatalogRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for ability in &catalog.abilities {
            if !seen.insert(ability.id) {
                anyhow::bail!("Ability {} is defined more than once", ability.id);
            }
        }

        let abilities = catalog.abilities.into_iter().map(|ability| {
            AbilityInfo::new(
                AbilityId(ability.id),
                ability.name,
                Duration::from_millis(ability.recharge_ms),
            )
        });
        Ok(AbilityCatalog::new(abilities)
            .with_global_cooldown(Duration::from_millis(catalog.global_cooldown_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_with_default_cooldown() {
        let catalog = AbilityLoader::parse(
            r#"(abilities: [
                (id: 1, name: "heal", recharge_ms: 3000),
                (id: 2, name: "ward", recharge_ms: 500),
            ])"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.global_cooldown(), AbilityCatalog::DEFAULT_GLOBAL_COOLDOWN);
        assert_eq!(
            catalog.get(AbilityId(1)).map(|info| info.recharge),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn explicit_global_cooldown() {
        let catalog =
            AbilityLoader::parse("(global_cooldown_ms: 250, abilities: [])").unwrap();
        assert_eq!(catalog.global_cooldown(), Duration::from_millis(250));
        assert!(catalog.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let error = AbilityLoader::parse(
            r#"(abilities: [
                (id: 1, name: "heal", recharge_ms: 3000),
                (id: 1, name: "heal again", recharge_ms: 3000),
            ])"#,
        )
        .unwrap_err();
        assert!(error.to_string().contains("more than once"));
    }
}
