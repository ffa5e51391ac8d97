//! Per-entity ability timers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::catalog::{AbilityCatalog, AbilityId};
use crate::entity::{Component, ComponentKind};

/// Recharge state of one possessed ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbilityRecord {
    pub recharge_remaining: Duration,
}

impl AbilityRecord {
    pub fn is_ready(&self) -> bool {
        self.recharge_remaining.is_zero()
    }
}

/// Notifications raised by the component, drained by whoever owns the sync
/// state of the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilitySignal {
    /// An ability was added, removed, or (re)started recharging.
    Changed(AbilityId),
    /// An activation started the global cooldown.
    GlobalCooldownActivated,
}

/// Why an activation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbilityDenied {
    #[error("global cooldown is still running")]
    GlobalCooldown,

    #[error("{0} is not possessed by this entity")]
    UnknownAbility(AbilityId),

    #[error("{0} is still recharging")]
    Recharging(AbilityId),
}

/// Abilities possessed by an entity.
#[derive(Clone, Debug)]
pub struct AbilityComponent {
    catalog: Arc<AbilityCatalog>,
    abilities: BTreeMap<AbilityId, AbilityRecord>,
    global_cooldown: Duration,
    signals: Vec<AbilitySignal>,
}

impl AbilityComponent {
    pub fn new(catalog: Arc<AbilityCatalog>) -> Self {
        Self {
            catalog,
            abilities: BTreeMap::new(),
            global_cooldown: Duration::ZERO,
            signals: Vec::new(),
        }
    }

    /// Grants an ability from the catalog, ready for use.
    ///
    /// Returns `false` if the catalog has no such ability or it is already
    /// possessed.
    pub fn give(&mut self, id: AbilityId) -> bool {
        if !self.catalog.contains(id) || self.abilities.contains_key(&id) {
            return false;
        }
        self.abilities.insert(id, AbilityRecord::default());
        self.signals.push(AbilitySignal::Changed(id));
        true
    }

    pub fn take(&mut self, id: AbilityId) -> bool {
        if self.abilities.remove(&id).is_none() {
            return false;
        }
        self.signals.push(AbilitySignal::Changed(id));
        true
    }

    /// Uses an ability: starts its recharge and the global cooldown.
    ///
    /// # Errors
    ///
    /// Refused while the global cooldown runs, for abilities the entity does
    /// not possess, and for abilities still recharging. A refusal leaves all
    /// timers untouched.
    pub fn activate(&mut self, id: AbilityId) -> Result<(), AbilityDenied> {
        if !self.global_cooldown.is_zero() {
            return Err(AbilityDenied::GlobalCooldown);
        }
        let recharge = self
            .catalog
            .get(id)
            .map(|info| info.recharge)
            .unwrap_or_default();
        let record = self
            .abilities
            .get_mut(&id)
            .ok_or(AbilityDenied::UnknownAbility(id))?;
        if !record.is_ready() {
            return Err(AbilityDenied::Recharging(id));
        }

        record.recharge_remaining = recharge;
        self.global_cooldown = self.catalog.global_cooldown();
        self.signals.push(AbilitySignal::Changed(id));
        self.signals.push(AbilitySignal::GlobalCooldownActivated);
        Ok(())
    }

    /// Advances every running timer. Expiry is silent; clients learn about
    /// readiness from the remaining times pushed at activation.
    pub fn tick(&mut self, elapsed: Duration) {
        self.global_cooldown = self.global_cooldown.saturating_sub(elapsed);
        for record in self.abilities.values_mut() {
            record.recharge_remaining = record.recharge_remaining.saturating_sub(elapsed);
        }
    }

    pub fn get(&self, id: AbilityId) -> Option<&AbilityRecord> {
        self.abilities.get(&id)
    }

    pub fn has(&self, id: AbilityId) -> bool {
        self.abilities.contains_key(&id)
    }

    pub fn abilities(&self) -> impl Iterator<Item = (AbilityId, &AbilityRecord)> + '_ {
        self.abilities.iter().map(|(id, record)| (*id, record))
    }

    pub fn global_cooldown(&self) -> Duration {
        self.global_cooldown
    }

    pub fn drain_signals(&mut self) -> std::vec::Drain<'_, AbilitySignal> {
        self.signals.drain(..)
    }
}

impl Component for AbilityComponent {
    const KIND: ComponentKind = ComponentKind::Ability;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityInfo;

    const HEAL: AbilityId = AbilityId(1);
    const STRIKE: AbilityId = AbilityId(2);

    fn component() -> AbilityComponent {
        let catalog = AbilityCatalog::new([
            AbilityInfo::new(HEAL, "heal", Duration::from_millis(5000)),
            AbilityInfo::new(STRIKE, "strike", Duration::from_millis(500)),
        ])
        .with_global_cooldown(Duration::from_millis(1000));
        let mut abilities = AbilityComponent::new(Arc::new(catalog));
        abilities.give(HEAL);
        abilities.give(STRIKE);
        abilities.drain_signals().for_each(drop);
        abilities
    }

    #[test]
    fn activation_starts_both_timers_and_signals() {
        let mut abilities = component();

        abilities.activate(HEAL).unwrap();

        assert_eq!(
            abilities.get(HEAL).unwrap().recharge_remaining,
            Duration::from_millis(5000)
        );
        assert_eq!(abilities.global_cooldown(), Duration::from_millis(1000));
        let signals: Vec<_> = abilities.drain_signals().collect();
        assert_eq!(
            signals,
            vec![
                AbilitySignal::Changed(HEAL),
                AbilitySignal::GlobalCooldownActivated
            ]
        );
    }

    #[test]
    fn global_cooldown_blocks_every_ability_without_touching_timers() {
        let mut abilities = component();
        abilities.activate(HEAL).unwrap();
        abilities.drain_signals().for_each(drop);

        assert_eq!(abilities.activate(STRIKE), Err(AbilityDenied::GlobalCooldown));

        assert!(abilities.get(STRIKE).unwrap().is_ready());
        assert_eq!(abilities.global_cooldown(), Duration::from_millis(1000));
        assert_eq!(abilities.drain_signals().count(), 0);
    }

    #[test]
    fn tick_expires_timers_silently() {
        let mut abilities = component();
        abilities.activate(STRIKE).unwrap();
        abilities.drain_signals().for_each(drop);

        abilities.tick(Duration::from_millis(600));
        assert!(abilities.get(STRIKE).unwrap().is_ready());
        assert_eq!(abilities.global_cooldown(), Duration::from_millis(400));

        abilities.tick(Duration::from_millis(600));
        assert!(abilities.global_cooldown().is_zero());
        assert_eq!(abilities.drain_signals().count(), 0);
        assert!(abilities.activate(STRIKE).is_ok());
    }

    #[test]
    fn recharging_ability_is_refused_after_global_cooldown() {
        let mut abilities = component();
        abilities.activate(HEAL).unwrap();
        abilities.tick(Duration::from_millis(1000));

        assert_eq!(abilities.activate(HEAL), Err(AbilityDenied::Recharging(HEAL)));
        assert!(abilities.activate(STRIKE).is_ok());
    }

    #[test]
    fn unknown_ability_is_refused() {
        let mut abilities = component();
        assert_eq!(
            abilities.activate(AbilityId(9)),
            Err(AbilityDenied::UnknownAbility(AbilityId(9)))
        );
        assert!(abilities.global_cooldown().is_zero());
    }

    #[test]
    fn give_and_take_mark_changes() {
        let mut abilities = component();

        assert!(!abilities.give(HEAL));
        assert!(!abilities.give(AbilityId(42)));
        assert!(abilities.take(HEAL));
        assert!(!abilities.take(HEAL));

        let signals: Vec<_> = abilities.drain_signals().collect();
        assert_eq!(signals, vec![AbilitySignal::Changed(HEAL)]);
    }
}
