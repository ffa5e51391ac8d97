//! Equipment and status-effect contributions to an attribute.
//!
//! Modifiers are applied on top of the derivation result in a fixed order:
//! `Flat → %Inc → More → Less`, followed by the attribute's bounds.

/// Opaque tag identifying who contributed a modifier (an equipped item
/// instance, a status effect, ...), so it can be withdrawn later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierSource(pub u32);

/// A single contribution to an attribute's modified value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    /// Added to the derived value before any multiplier.
    Flat(f64),
    /// Percentage increase; all increases are summed then applied once.
    Increased(f64),
    /// Sequential multiplier, 50 = ×1.5.
    More(f64),
    /// Sequential reduction, 10 = ×0.9.
    Less(f64),
}

/// Ordered collection of modifiers for one attribute.
///
/// ```
/// # use game_core::attribute::{Modifier, ModifierSource, ModifierStack};
/// let mut stack = ModifierStack::new();
/// stack.add(ModifierSource(1), Modifier::Flat(5.0));
/// stack.add(ModifierSource(2), Modifier::Increased(20.0));
/// stack.add(ModifierSource(2), Modifier::More(50.0));
///
/// // (10 + 5) × 1.2 × 1.5
/// assert_eq!(stack.apply(10.0), 27.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierStack {
    entries: Vec<(ModifierSource, Modifier)>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: ModifierSource, modifier: Modifier) {
        self.entries.push((source, modifier));
    }

    /// Drops every modifier contributed by `source`. Returns whether anything
    /// was removed.
    pub fn remove_source(&mut self, source: ModifierSource) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(owner, _)| *owner != source);
        self.entries.len() != before
    }

    pub fn apply(&self, value: f64) -> f64 {
        let modifiers = || self.entries.iter().map(|(_, modifier)| *modifier);

        let flat: f64 = modifiers()
            .filter_map(|m| match m {
                Modifier::Flat(v) => Some(v),
                _ => None,
            })
            .sum();
        let increased: f64 = modifiers()
            .filter_map(|m| match m {
                Modifier::Increased(p) => Some(p),
                _ => None,
            })
            .sum();

        let mut result = (value + flat) * (1.0 + increased / 100.0);
        for modifier in modifiers() {
            match modifier {
                Modifier::More(p) => result *= 1.0 + p / 100.0,
                Modifier::Less(p) => result *= 1.0 - p / 100.0,
                Modifier::Flat(_) | Modifier::Increased(_) => {}
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
