//! Spendable attribute points and correction points.

use crate::attribute::AttributeId;
use crate::entity::BeingComponent;

/// Outcome of a point spend, reported back to the client as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttribmodResponse {
    Ok,
    /// The attribute is not directly modifiable by players.
    InvalidAttribute,
    NoPointsLeft,
    /// The spend would push the attribute below its floor.
    Denied,
}

/// Point balances of one character.
///
/// Balances only move through the spend operations and the explicit setters
/// used when levelling; every movement raises the points-status flag, drained
/// with [`take_changed`](Self::take_changed).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressionLedger {
    attribute_points: u32,
    correction_points: u32,
    changed: bool,
}

impl ProgressionLedger {
    /// Lowest base a correction may leave behind.
    pub const CORRECTION_FLOOR: f64 = 1.0;

    pub fn new(attribute_points: u32, correction_points: u32) -> Self {
        Self {
            attribute_points,
            correction_points,
            changed: false,
        }
    }

    pub fn attribute_points(&self) -> u32 {
        self.attribute_points
    }

    pub fn correction_points(&self) -> u32 {
        self.correction_points
    }

    pub fn set_attribute_points(&mut self, points: u32) {
        self.attribute_points = points;
        self.changed = true;
    }

    pub fn set_correction_points(&mut self, points: u32) {
        self.correction_points = points;
        self.changed = true;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Spends one attribute point to raise `attribute`'s base by one.
    ///
    /// The attribute and everything derived from it are recalculated.
    pub fn use_character_point(
        &mut self,
        being: &mut BeingComponent,
        attribute: AttributeId,
    ) -> AttribmodResponse {
        let Some(base) = Self::spendable_base(being, attribute) else {
            return AttribmodResponse::InvalidAttribute;
        };
        if self.attribute_points == 0 {
            return AttribmodResponse::NoPointsLeft;
        }

        self.set_attribute_points(self.attribute_points - 1);
        being.set_attribute(attribute, base + 1.0);
        AttribmodResponse::Ok
    }

    /// Spends one correction point to lower `attribute`'s base by one and
    /// refund the attribute point it cost.
    ///
    /// Recalculation of dependents happens exactly as for
    /// [`use_character_point`](Self::use_character_point). Denied when the
    /// refund would overflow the attribute point balance.
    pub fn use_correction_point(
        &mut self,
        being: &mut BeingComponent,
        attribute: AttributeId,
    ) -> AttribmodResponse {
        let Some(base) = Self::spendable_base(being, attribute) else {
            return AttribmodResponse::InvalidAttribute;
        };
        if self.correction_points == 0 {
            return AttribmodResponse::NoPointsLeft;
        }
        if base <= Self::CORRECTION_FLOOR {
            return AttribmodResponse::Denied;
        }
        let Some(refunded) = self.attribute_points.checked_add(1) else {
            return AttribmodResponse::Denied;
        };

        self.set_correction_points(self.correction_points - 1);
        self.set_attribute_points(refunded);
        being.set_attribute(attribute, base - 1.0);
        AttribmodResponse::Ok
    }

    /// Current base of a directly modifiable attribute the being carries.
    fn spendable_base(being: &BeingComponent, attribute: AttributeId) -> Option<f64> {
        if !being
            .attributes()
            .registry()
            .is_directly_modifiable(attribute)
        {
            return None;
        }
        being.attribute_base(attribute)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::attribute::{
        AttributeInfo, AttributeRegistry, AttributeScopes, AttributeStore, DerivationTerm,
    };

    const STR: AttributeId = AttributeId(1);
    const ATTACK: AttributeId = AttributeId(2);

    fn being(strength: f64) -> BeingComponent {
        let scope = AttributeScopes::CHARACTER;
        let registry = AttributeRegistry::new([
            AttributeInfo::new(STR, "strength", scope)
                .modifiable()
                .with_default_base(strength),
            AttributeInfo::new(ATTACK, "attack", scope).derived([DerivationTerm::new(STR, 2.0)]),
        ])
        .unwrap();
        let mut being = BeingComponent::new(
            "tester",
            AttributeStore::for_scope(Arc::new(registry), scope),
        );
        being.take_changed();
        being
    }

    #[test]
    fn three_points_then_none_left() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(3, 0);

        for _ in 0..3 {
            assert_eq!(
                ledger.use_character_point(&mut being, STR),
                AttribmodResponse::Ok
            );
        }

        assert_eq!(ledger.attribute_points(), 0);
        assert_eq!(being.attribute_base(STR), Some(8.0));
        assert_eq!(being.modified_attribute(ATTACK), Some(16.0));
        assert_eq!(
            ledger.use_character_point(&mut being, STR),
            AttribmodResponse::NoPointsLeft
        );
        assert_eq!(being.attribute_base(STR), Some(8.0));
    }

    #[test]
    fn non_modifiable_attribute_changes_nothing() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(2, 2);

        assert_eq!(
            ledger.use_character_point(&mut being, ATTACK),
            AttribmodResponse::InvalidAttribute
        );
        assert_eq!(
            ledger.use_correction_point(&mut being, ATTACK),
            AttribmodResponse::InvalidAttribute
        );
        assert_eq!(
            ledger.use_character_point(&mut being, AttributeId(99)),
            AttribmodResponse::InvalidAttribute
        );

        assert_eq!(ledger, ProgressionLedger::new(2, 2));
        assert!(being.take_changed().is_empty());
    }

    #[test]
    fn invalid_attribute_takes_precedence_over_empty_balance() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(0, 0);
        assert_eq!(
            ledger.use_character_point(&mut being, ATTACK),
            AttribmodResponse::InvalidAttribute
        );
    }

    #[test]
    fn correction_refunds_and_recalculates_dependents() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(0, 1);

        assert_eq!(
            ledger.use_correction_point(&mut being, STR),
            AttribmodResponse::Ok
        );

        assert_eq!(ledger.correction_points(), 0);
        assert_eq!(ledger.attribute_points(), 1);
        assert_eq!(being.attribute_base(STR), Some(4.0));
        assert_eq!(being.modified_attribute(ATTACK), Some(8.0));
        let changed = being.take_changed();
        assert!(changed.contains(&STR) && changed.contains(&ATTACK));
    }

    #[test]
    fn correction_respects_the_floor() {
        let mut being = being(1.0);
        let mut ledger = ProgressionLedger::new(0, 4);

        assert_eq!(
            ledger.use_correction_point(&mut being, STR),
            AttribmodResponse::Denied
        );
        assert_eq!(ledger.correction_points(), 4);
        assert_eq!(ledger.attribute_points(), 0);
        assert_eq!(being.attribute_base(STR), Some(1.0));
        assert!(!ledger.take_changed());
    }

    #[test]
    fn correction_refund_at_the_balance_ceiling_is_denied() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(u32::MAX, 2);

        assert_eq!(
            ledger.use_correction_point(&mut being, STR),
            AttribmodResponse::Denied
        );
        assert_eq!(ledger.attribute_points(), u32::MAX);
        assert_eq!(ledger.correction_points(), 2);
        assert_eq!(being.attribute_base(STR), Some(5.0));
        assert!(!ledger.take_changed());
    }

    #[test]
    fn correction_without_points() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(3, 0);
        assert_eq!(
            ledger.use_correction_point(&mut being, STR),
            AttribmodResponse::NoPointsLeft
        );
        assert_eq!(being.attribute_base(STR), Some(5.0));
    }

    #[test]
    fn every_balance_change_raises_the_flag() {
        let mut being = being(5.0);
        let mut ledger = ProgressionLedger::new(1, 0);
        assert!(!ledger.take_changed());

        ledger.use_character_point(&mut being, STR);
        assert!(ledger.take_changed());
        assert!(!ledger.take_changed());
    }
}
