//! Per-entity attribute values.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::modifier::{Modifier, ModifierSource, ModifierStack};
use super::registry::{AttributeId, AttributeRegistry, AttributeScopes, Derivation};

/// Base and modified value of one attribute on one entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeRecord {
    base: f64,
    modified: f64,
    modifiers: ModifierStack,
}

impl AttributeRecord {
    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn modified(&self) -> f64 {
        self.modified
    }

    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }
}

/// Attribute values owned by a single entity.
///
/// Every mutation recalculates the touched attribute and, for base changes,
/// all of its transitive dependents before returning, so `modified` is never
/// observed stale from outside the store. Mutators return the ids whose
/// records were rewritten so the caller can propagate change notifications.
#[derive(Clone, Debug)]
pub struct AttributeStore {
    registry: Arc<AttributeRegistry>,
    records: BTreeMap<AttributeId, AttributeRecord>,
}

impl AttributeStore {
    pub fn new(registry: Arc<AttributeRegistry>) -> Self {
        Self {
            registry,
            records: BTreeMap::new(),
        }
    }

    /// Creates every attribute of `scopes` at its registry default base.
    pub fn for_scope(registry: Arc<AttributeRegistry>, scopes: AttributeScopes) -> Self {
        let mut store = Self::new(Arc::clone(&registry));
        for info in registry.scope(scopes) {
            store.records.insert(
                info.id,
                AttributeRecord {
                    base: info.default_base,
                    ..AttributeRecord::default()
                },
            );
        }
        store.recalculate_all();
        store
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Adds an attribute to this entity. Returns `false` if the registry does
    /// not know it or the entity already has it.
    pub fn create(&mut self, id: AttributeId, base: f64) -> bool {
        if !self.registry.contains(id) || self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(
            id,
            AttributeRecord {
                base,
                ..AttributeRecord::default()
            },
        );
        self.recalculate(id);
        true
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.records.keys().copied()
    }

    pub fn get(&self, id: AttributeId) -> Option<&AttributeRecord> {
        self.records.get(&id)
    }

    pub fn base(&self, id: AttributeId) -> Option<f64> {
        self.records.get(&id).map(|record| record.base)
    }

    pub fn modified(&self, id: AttributeId) -> Option<f64> {
        self.records.get(&id).map(|record| record.modified)
    }

    /// Sets the base of `id` and recalculates it along with every dependent
    /// the entity carries.
    ///
    /// Returns the affected ids in recalculation order; empty when the entity
    /// has no such attribute.
    pub fn set_base(&mut self, id: AttributeId, value: f64) -> Vec<AttributeId> {
        let Some(record) = self.records.get_mut(&id) else {
            return Vec::new();
        };
        record.base = value;

        let mut touched = vec![id];
        touched.extend(
            self.registry
                .dependents(id)
                .iter()
                .copied()
                .filter(|dependent| self.records.contains_key(dependent)),
        );
        for attribute in &touched {
            self.recalculate(*attribute);
        }
        touched
    }

    /// Recomputes `modified` for `id` from the current bases of its sources.
    ///
    /// Idempotent: without an intervening base or modifier change the result
    /// is identical. Returns whether the stored value changed.
    pub fn recalculate(&mut self, id: AttributeId) -> bool {
        let Some(info) = self.registry.get(id) else {
            return false;
        };
        let Some(base) = self.base(id) else {
            return false;
        };

        let derived = match &info.derivation {
            Derivation::Base => base,
            Derivation::Linear(terms) => {
                base + terms
                    .iter()
                    .map(|term| term.weight * self.base(term.source).unwrap_or(0.0))
                    .sum::<f64>()
            }
        };
        let bounds = info.bounds;

        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        let value = bounds.clamp(record.modifiers.apply(derived));
        let changed = record.modified != value;
        record.modified = value;
        changed
    }

    /// Recalculates every attribute the entity carries.
    ///
    /// Derivations read bases only, so the visiting order is irrelevant.
    pub fn recalculate_all(&mut self) {
        let ids: Vec<AttributeId> = self.records.keys().copied().collect();
        for id in ids {
            self.recalculate(id);
        }
    }

    /// Attaches a modifier and recalculates the attribute it targets.
    ///
    /// Dependents derive from bases, so they are not affected.
    pub fn add_modifier(
        &mut self,
        id: AttributeId,
        source: ModifierSource,
        modifier: Modifier,
    ) -> Vec<AttributeId> {
        let Some(record) = self.records.get_mut(&id) else {
            return Vec::new();
        };
        record.modifiers.add(source, modifier);
        self.recalculate(id);
        vec![id]
    }

    pub fn remove_modifier(&mut self, id: AttributeId, source: ModifierSource) -> Vec<AttributeId> {
        let Some(record) = self.records.get_mut(&id) else {
            return Vec::new();
        };
        if !record.modifiers.remove_source(source) {
            return Vec::new();
        }
        self.recalculate(id);
        vec![id]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeBounds, AttributeInfo, DerivationTerm};

    const STR: AttributeId = AttributeId(1);
    const DEX: AttributeId = AttributeId(2);
    const ATTACK: AttributeId = AttributeId(3);
    const DAMAGE: AttributeId = AttributeId(4);

    fn registry() -> Arc<AttributeRegistry> {
        let scope = AttributeScopes::CHARACTER;
        Arc::new(
            AttributeRegistry::new([
                AttributeInfo::new(STR, "strength", scope)
                    .modifiable()
                    .with_default_base(5.0),
                AttributeInfo::new(DEX, "dexterity", scope)
                    .modifiable()
                    .with_default_base(3.0),
                AttributeInfo::new(ATTACK, "attack", scope).derived([
                    DerivationTerm::new(STR, 2.0),
                    DerivationTerm::new(DEX, 1.0),
                ]),
                AttributeInfo::new(DAMAGE, "damage", scope)
                    .derived([DerivationTerm::new(ATTACK, 0.5)])
                    .bounded(AttributeBounds::new(0.0, 20.0)),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn scope_creation_derives_initial_values() {
        let store = AttributeStore::for_scope(registry(), AttributeScopes::CHARACTER);

        assert_eq!(store.len(), 4);
        assert_eq!(store.modified(STR), Some(5.0));
        // 0 + 2×5 + 3
        assert_eq!(store.modified(ATTACK), Some(13.0));
        // Derived from ATTACK's base (0), not its modified value.
        assert_eq!(store.modified(DAMAGE), Some(0.0));
    }

    #[test]
    fn base_change_reaches_dependents() {
        let mut store = AttributeStore::for_scope(registry(), AttributeScopes::CHARACTER);

        let touched = store.set_base(STR, 6.0);

        assert_eq!(touched, vec![STR, ATTACK, DAMAGE]);
        assert_eq!(store.base(STR), Some(6.0));
        assert_eq!(store.modified(ATTACK), Some(15.0));
    }

    #[test]
    fn transitive_change_and_bounds() {
        let mut store = AttributeStore::for_scope(registry(), AttributeScopes::CHARACTER);

        store.set_base(ATTACK, 100.0);

        assert_eq!(store.modified(ATTACK), Some(113.0));
        assert_eq!(store.modified(DAMAGE), Some(20.0));
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut store = AttributeStore::for_scope(registry(), AttributeScopes::CHARACTER);
        store.set_base(DEX, 7.0);

        let first = store.modified(ATTACK);
        assert!(!store.recalculate(ATTACK));
        assert!(!store.recalculate(ATTACK));
        assert_eq!(store.modified(ATTACK), first);
    }

    #[test]
    fn unknown_attribute_is_a_no_op() {
        let mut store = AttributeStore::for_scope(registry(), AttributeScopes::CHARACTER);
        assert!(store.set_base(AttributeId(77), 1.0).is_empty());
        assert!(!store.create(AttributeId(77), 1.0));
        assert_eq!(store.base(AttributeId(77)), None);
    }

    #[test]
    fn modifiers_apply_after_derivation() {
        let mut store = AttributeStore::for_scope(registry(), AttributeScopes::CHARACTER);

        let touched = store.add_modifier(ATTACK, ModifierSource(9), Modifier::Flat(7.0));
        assert_eq!(touched, vec![ATTACK]);
        assert_eq!(store.modified(ATTACK), Some(20.0));

        store.remove_modifier(ATTACK, ModifierSource(9));
        assert_eq!(store.modified(ATTACK), Some(13.0));
        assert!(store.remove_modifier(ATTACK, ModifierSource(9)).is_empty());
    }
}
