//! Process-wide attribute catalog.
//!
//! Loaded once at startup and shared behind an `Arc`; nothing mutates it
//! afterwards. Construction validates that derivation rules only reference
//! known attributes and that the dependency graph is acyclic, and precomputes
//! for every attribute the ordered list of attributes that transitively
//! depend on it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use bitflags::bitflags;

use crate::error::{ErrorSeverity, GameError};

/// Identifier of a semantic attribute (strength, max hit points, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AttributeId(pub u16);

impl AttributeId {
    /// Current vitality. Read by the damage and respawn paths.
    pub const HP: Self = Self(13);
    /// Maximum vitality, restored on a default respawn.
    pub const MAX_HP: Self = Self(14);
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attr:{}", self.0)
    }
}

bitflags! {
    /// Categories of entity an attribute applies to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AttributeScopes: u8 {
        const CHARACTER = 1 << 0;
        const MONSTER   = 1 << 1;
        const BEING     = Self::CHARACTER.bits() | Self::MONSTER.bits();
    }
}

/// One weighted input of a [`Derivation::Linear`] rule.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivationTerm {
    pub source: AttributeId,
    pub weight: f64,
}

impl DerivationTerm {
    pub const fn new(source: AttributeId, weight: f64) -> Self {
        Self { source, weight }
    }
}

/// How the modified value of an attribute is computed from base values.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Derivation {
    /// `modified = base`
    #[default]
    Base,
    /// `modified = base + Σ weight × base(source)`
    Linear(Vec<DerivationTerm>),
}

impl Derivation {
    /// Attributes whose base values feed this rule.
    pub fn sources(&self) -> impl Iterator<Item = AttributeId> + '_ {
        let terms: &[DerivationTerm] = match self {
            Derivation::Base => &[],
            Derivation::Linear(terms) => terms,
        };
        terms.iter().map(|term| term.source)
    }
}

/// Clamp applied to the modified value after modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeBounds {
    pub min: f64,
    pub max: f64,
}

impl AttributeBounds {
    pub const UNBOUNDED: Self = Self {
        min: f64::MIN,
        max: f64::MAX,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `min <= max`, with neither bound NaN.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Default for AttributeBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Registry entry for one attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeInfo {
    pub id: AttributeId,
    pub name: String,
    pub scopes: AttributeScopes,
    /// Whether players may spend progression points on this attribute.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub derivation: Derivation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds: AttributeBounds,
    /// Base value given to a freshly created entity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_base: f64,
}

impl AttributeInfo {
    pub fn new(id: AttributeId, name: impl Into<String>, scopes: AttributeScopes) -> Self {
        Self {
            id,
            name: name.into(),
            scopes,
            modifiable: false,
            derivation: Derivation::Base,
            bounds: AttributeBounds::UNBOUNDED,
            default_base: 0.0,
        }
    }

    pub fn modifiable(mut self) -> Self {
        self.modifiable = true;
        self
    }

    pub fn derived(mut self, terms: impl IntoIterator<Item = DerivationTerm>) -> Self {
        self.derivation = Derivation::Linear(terms.into_iter().collect());
        self
    }

    pub fn bounded(mut self, bounds: AttributeBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_default_base(mut self, base: f64) -> Self {
        self.default_base = base;
        self
    }
}

/// Errors detected while validating a registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("attribute {0} is defined more than once")]
    DuplicateAttribute(AttributeId),

    #[error("attribute {attribute} derives from unknown attribute {source_id}")]
    UnknownDependency {
        attribute: AttributeId,
        source_id: AttributeId,
    },

    #[error("attribute {0} takes part in a derivation cycle")]
    CyclicDerivation(AttributeId),

    #[error("attribute {0} has a minimum above its maximum or a NaN bound")]
    InvalidBounds(AttributeId),
}

impl GameError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAttribute(_) => "REGISTRY_DUPLICATE_ATTRIBUTE",
            Self::UnknownDependency { .. } => "REGISTRY_UNKNOWN_DEPENDENCY",
            Self::CyclicDerivation(_) => "REGISTRY_CYCLIC_DERIVATION",
            Self::InvalidBounds(_) => "REGISTRY_INVALID_BOUNDS",
        }
    }
}

/// Immutable attribute catalog.
#[derive(Clone, Debug, Default)]
pub struct AttributeRegistry {
    attributes: BTreeMap<AttributeId, AttributeInfo>,
    /// Transitive dependents per attribute, in recalculation order.
    dependents: BTreeMap<AttributeId, Vec<AttributeId>>,
}

impl AttributeRegistry {
    /// Validates and indexes the given attribute definitions.
    ///
    /// # Errors
    ///
    /// Fails on duplicate ids, unusable bounds, derivations referencing
    /// unknown attributes, or any dependency cycle (including an attribute
    /// deriving from itself).
    pub fn new(infos: impl IntoIterator<Item = AttributeInfo>) -> Result<Self, RegistryError> {
        let mut attributes = BTreeMap::new();
        for info in infos {
            let id = info.id;
            if !info.bounds.is_valid() {
                return Err(RegistryError::InvalidBounds(id));
            }
            if attributes.insert(id, info).is_some() {
                return Err(RegistryError::DuplicateAttribute(id));
            }
        }

        // Edges run from a source to the attributes derived from it.
        let mut direct: BTreeMap<AttributeId, BTreeSet<AttributeId>> = BTreeMap::new();
        let mut in_degree: BTreeMap<AttributeId, usize> =
            attributes.keys().map(|id| (*id, 0)).collect();
        for info in attributes.values() {
            for source in info.derivation.sources() {
                if !attributes.contains_key(&source) {
                    return Err(RegistryError::UnknownDependency {
                        attribute: info.id,
                        source_id: source,
                    });
                }
                if direct.entry(source).or_default().insert(info.id) {
                    *in_degree.entry(info.id).or_default() += 1;
                }
            }
        }

        let order = topological_order(&direct, in_degree)?;
        let rank: BTreeMap<AttributeId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut dependents = BTreeMap::new();
        for id in attributes.keys() {
            let mut reached = BTreeSet::new();
            let mut stack: Vec<AttributeId> = direct
                .get(id)
                .map(|next| next.iter().copied().collect())
                .unwrap_or_default();
            while let Some(next) = stack.pop() {
                if reached.insert(next) {
                    if let Some(further) = direct.get(&next) {
                        stack.extend(further.iter().copied());
                    }
                }
            }
            let mut reached: Vec<AttributeId> = reached.into_iter().collect();
            reached.sort_by_key(|dependent| rank[dependent]);
            dependents.insert(*id, reached);
        }

        Ok(Self {
            attributes,
            dependents,
        })
    }

    pub fn get(&self, id: AttributeId) -> Option<&AttributeInfo> {
        self.attributes.get(&id)
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        self.attributes.contains_key(&id)
    }

    /// Unknown attributes are never modifiable.
    pub fn is_directly_modifiable(&self, id: AttributeId) -> bool {
        self.get(id).is_some_and(|info| info.modifiable)
    }

    /// Attributes that apply to any of the given scopes.
    pub fn scope(&self, scopes: AttributeScopes) -> impl Iterator<Item = &AttributeInfo> + '_ {
        self.attributes
            .values()
            .filter(move |info| info.scopes.intersects(scopes))
    }

    /// Every attribute that transitively derives from `id`, ordered so that an
    /// attribute always comes after everything it depends on.
    pub fn dependents(&self, id: AttributeId) -> &[AttributeId] {
        self.dependents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeInfo> + '_ {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Kahn's algorithm; anything left unvisited sits on a cycle.
fn topological_order(
    direct: &BTreeMap<AttributeId, BTreeSet<AttributeId>>,
    mut in_degree: BTreeMap<AttributeId, usize>,
) -> Result<Vec<AttributeId>, RegistryError> {
    let mut ready: VecDeque<AttributeId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(id) = ready.pop_front() {
        order.push(id);
        for next in direct.get(&id).into_iter().flatten() {
            let degree = in_degree.entry(*next).or_default();
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(*next);
            }
        }
    }

    if order.len() == in_degree.len() {
        Ok(order)
    } else {
        let stuck = in_degree
            .into_iter()
            .find(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .unwrap_or_default();
        Err(RegistryError::CyclicDerivation(stuck))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STR: AttributeId = AttributeId(1);
    const VIT: AttributeId = AttributeId(2);
    const ATTACK: AttributeId = AttributeId(3);
    const CARRY: AttributeId = AttributeId(4);

    fn info(id: AttributeId) -> AttributeInfo {
        AttributeInfo::new(id, format!("a{}", id.0), AttributeScopes::CHARACTER)
    }

    #[test]
    fn dependents_are_transitive_and_ordered() {
        let registry = AttributeRegistry::new([
            info(STR).modifiable(),
            info(VIT).modifiable(),
            info(CARRY).derived([DerivationTerm::new(ATTACK, 1.0)]),
            info(ATTACK).derived([
                DerivationTerm::new(STR, 2.0),
                DerivationTerm::new(VIT, 0.5),
            ]),
        ])
        .unwrap();

        assert_eq!(registry.dependents(STR), &[ATTACK, CARRY]);
        assert_eq!(registry.dependents(ATTACK), &[CARRY]);
        assert!(registry.dependents(CARRY).is_empty());
    }

    #[test]
    fn cycle_is_rejected() {
        let result = AttributeRegistry::new([
            info(STR).derived([DerivationTerm::new(VIT, 1.0)]),
            info(VIT).derived([DerivationTerm::new(STR, 1.0)]),
        ]);
        assert!(matches!(result, Err(RegistryError::CyclicDerivation(_))));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let result = AttributeRegistry::new([info(STR).derived([DerivationTerm::new(STR, 1.0)])]);
        assert_eq!(result.unwrap_err(), RegistryError::CyclicDerivation(STR));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let result = AttributeRegistry::new([info(ATTACK).derived([DerivationTerm::new(STR, 1.0)])]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::UnknownDependency {
                attribute: ATTACK,
                source_id: STR
            }
        );
    }

    #[test]
    fn duplicate_is_rejected() {
        let result = AttributeRegistry::new([info(STR), info(STR)]);
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateAttribute(STR));
    }

    #[test]
    fn inverted_or_nan_bounds_are_rejected() {
        let inverted = AttributeRegistry::new([info(STR).bounded(AttributeBounds::new(10.0, 5.0))]);
        assert_eq!(inverted.unwrap_err(), RegistryError::InvalidBounds(STR));

        let nan = AttributeRegistry::new([info(STR).bounded(AttributeBounds::new(f64::NAN, 5.0))]);
        assert_eq!(nan.unwrap_err(), RegistryError::InvalidBounds(STR));

        assert!(AttributeRegistry::new([info(STR).bounded(AttributeBounds::new(5.0, 5.0))]).is_ok());
    }

    #[test]
    fn modifiability_and_scope_queries() {
        let registry = AttributeRegistry::new([
            info(STR).modifiable(),
            AttributeInfo::new(VIT, "monster only", AttributeScopes::MONSTER),
        ])
        .unwrap();

        assert!(registry.is_directly_modifiable(STR));
        assert!(!registry.is_directly_modifiable(VIT));
        assert!(!registry.is_directly_modifiable(AttributeId(99)));

        let character: Vec<_> = registry
            .scope(AttributeScopes::CHARACTER)
            .map(|info| info.id)
            .collect();
        assert_eq!(character, vec![STR]);
        assert_eq!(registry.scope(AttributeScopes::BEING).count(), 2);
    }
}
