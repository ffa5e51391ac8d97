//! Attribute registry loader.

use std::path::Path;

use anyhow::Context;
use game_core::{
    AttributeBounds, AttributeId, AttributeInfo, AttributeRegistry, AttributeScopes,
    DerivationTerm,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Attribute catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCatalogRon {
    pub attributes: Vec<AttributeRon>,
}

/// One attribute definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeRon {
    pub id: u16,
    pub name: String,
    /// Bitflag names, e.g. `"CHARACTER | MONSTER"`.
    pub scopes: AttributeScopes,
    #[serde(default)]
    pub modifiable: bool,
    /// `(source, weight)` pairs added to the base value.
    #[serde(default)]
    pub derived_from: Vec<(u16, f64)>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub default_base: f64,
}

impl From<AttributeRon> for AttributeInfo {
    fn from(entry: AttributeRon) -> Self {
        let mut info = AttributeInfo::new(AttributeId(entry.id), entry.name, entry.scopes)
            .bounded(AttributeBounds::new(
                entry.min.unwrap_or(f64::MIN),
                entry.max.unwrap_or(f64::MAX),
            ))
            .with_default_base(entry.default_base);
        if entry.modifiable {
            info = info.modifiable();
        }
        if !entry.derived_from.is_empty() {
            info = info.derived(
                entry.derived_from
                    .into_iter()
                    .map(|(source, weight)| DerivationTerm::new(AttributeId(source), weight)),
            );
        }
        info
    }
}

/// Loader for the attribute registry from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Load and validate an attribute registry from a RON file.
    ///
    /// Fails on unreadable files, malformed RON, duplicate ids, inverted
    /// bounds, unknown derivation sources and derivation cycles.
    pub fn load(path: &Path) -> LoadResult<AttributeRegistry> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<AttributeRegistry> {
        let catalog: AttributeCatalogRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute catalog RON: {}", e))?;

        let registry = AttributeRegistry::new(catalog.attributes.into_iter().map(Into::into))
            .context("Invalid attribute registry")?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::RegistryError;

    const CATALOG: &str = r#"(
        attributes: [
            (id: 1, name: "strength", scopes: "CHARACTER", modifiable: true, default_base: 1.0),
            (id: 13, name: "hp", scopes: "CHARACTER | MONSTER", min: Some(0.0)),
            (id: 14, name: "max_hp", scopes: "CHARACTER | MONSTER", derived_from: [(1, 10.0)]),
        ],
    )"#;

    #[test]
    fn parses_catalog_into_registry() {
        let registry = AttributeLoader::parse(CATALOG).unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.is_directly_modifiable(AttributeId(1)));
        assert!(!registry.is_directly_modifiable(AttributeId::HP));
        assert_eq!(registry.dependents(AttributeId(1)), [AttributeId::MAX_HP]);

        let hp = registry.get(AttributeId::HP).unwrap();
        assert_eq!(hp.bounds.min, 0.0);
        assert!(hp.scopes.contains(AttributeScopes::MONSTER));
        assert_eq!(
            registry.get(AttributeId(1)).map(|info| info.default_base),
            Some(1.0)
        );
    }

    #[test]
    fn cyclic_catalog_is_rejected() {
        let catalog = r#"(
            attributes: [
                (id: 1, name: "a", scopes: "CHARACTER", derived_from: [(2, 1.0)]),
                (id: 2, name: "b", scopes: "CHARACTER", derived_from: [(1, 1.0)]),
            ],
        )"#;

        let error = AttributeLoader::parse(catalog).unwrap_err();
        assert!(error.to_string().contains("Invalid attribute registry"));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let catalog = r#"(
            attributes: [
                (id: 13, name: "hp", scopes: "CHARACTER", min: Some(10.0), max: Some(5.0)),
            ],
        )"#;

        let error = AttributeLoader::parse(catalog).unwrap_err();
        assert_eq!(
            error.downcast_ref::<RegistryError>(),
            Some(&RegistryError::InvalidBounds(AttributeId::HP))
        );
    }

    #[test]
    fn load_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attributes.ron");
        std::fs::write(&path, "(attributes: [(id: 1)])").unwrap();

        let error = AttributeLoader::load(&path).unwrap_err();
        assert!(format!("{error:#}").contains("attributes.ron"));
    }
}
