//! Building a character from the data the account server hands over at login.

use crate::ability::{AbilityComponent, AbilityId};
use crate::attribute::AttributeId;
use crate::entity::{ActorComponent, BeingComponent, ComponentKind, Entity, MapId, Position};
use crate::error::{ErrorSeverity, GameError};
use crate::sync::{MessageIn, WireError};

use super::kills::{KillCounts, MonsterTypeId};
use super::progression::ProgressionLedger;

/// Inbound character data could not be turned into a character.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("character data references unknown attribute {0}")]
    UnknownAttribute(AttributeId),

    #[error("character data references unknown ability {0}")]
    UnknownAbility(AbilityId),

    #[error("field `{field}` has invalid value {value}")]
    InvalidValue { field: &'static str, value: i64 },

    #[error("character entity lacks its {0} component")]
    MissingComponent(ComponentKind),
}

impl GameError for ConstructionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingComponent(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Wire(error) => error.error_code(),
            Self::UnknownAttribute(_) => "CONSTRUCT_UNKNOWN_ATTRIBUTE",
            Self::UnknownAbility(_) => "CONSTRUCT_UNKNOWN_ABILITY",
            Self::InvalidValue { .. } => "CONSTRUCT_INVALID_VALUE",
            Self::MissingComponent(_) => "CONSTRUCT_MISSING_COMPONENT",
        }
    }
}

/// Write access to a character under construction.
pub struct CharacterData<'a> {
    pub(super) entity: &'a mut Entity,
    pub(super) ledger: &'a mut ProgressionLedger,
    pub(super) kills: &'a mut KillCounts,
}

impl CharacterData<'_> {
    pub fn set_attribute_points(&mut self, points: u32) {
        self.ledger.set_attribute_points(points);
    }

    pub fn set_correction_points(&mut self, points: u32) {
        self.ledger.set_correction_points(points);
    }

    pub fn set_attribute_base(
        &mut self,
        id: AttributeId,
        value: f64,
    ) -> Result<(), ConstructionError> {
        let being = self
            .entity
            .get_mut::<BeingComponent>()
            .ok_or(ConstructionError::MissingComponent(ComponentKind::Being))?;
        if being.set_attribute(id, value) {
            Ok(())
        } else {
            Err(ConstructionError::UnknownAttribute(id))
        }
    }

    pub fn set_location(&mut self, map: MapId, position: Position) -> Result<(), ConstructionError> {
        let actor = self
            .entity
            .get_mut::<ActorComponent>()
            .ok_or(ConstructionError::MissingComponent(ComponentKind::Actor))?;
        actor.map = map;
        actor.position = position;
        Ok(())
    }

    pub fn set_kill_count(&mut self, monster: MonsterTypeId, count: u32) {
        self.kills.restore(monster, count);
    }

    pub fn give_ability(&mut self, id: AbilityId) -> Result<(), ConstructionError> {
        let abilities = self
            .entity
            .get_mut::<AbilityComponent>()
            .ok_or(ConstructionError::MissingComponent(ComponentKind::Ability))?;
        if abilities.give(id) || abilities.has(id) {
            Ok(())
        } else {
            Err(ConstructionError::UnknownAbility(id))
        }
    }
}

/// Reads the serialized attribute payload that follows the database id and
/// name in the login message.
pub trait CharacterDeserializer {
    fn deserialize(
        &self,
        data: &mut CharacterData<'_>,
        msg: &mut MessageIn<'_>,
    ) -> Result<(), ConstructionError>;
}

/// The payload layout used by the account server:
///
/// ```text
/// attribute_points   i16
/// correction_points  i16
/// attribute_count    i16   { id: i16, base×256: i32 }*
/// map, x, y          i16 ×3
/// kill_entries       i16   { monster: i16, count: i32 }*
/// ability_count      i16   { id: i8 }*
/// ```
///
/// Inventory data may follow and is left unread for its own deserializer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardCharacterData;

impl CharacterDeserializer for StandardCharacterData {
    fn deserialize(
        &self,
        data: &mut CharacterData<'_>,
        msg: &mut MessageIn<'_>,
    ) -> Result<(), ConstructionError> {
        let attribute_points = non_negative("attribute_points", msg.read_i16()?.into())?;
        let correction_points = non_negative("correction_points", msg.read_i16()?.into())?;
        data.set_attribute_points(attribute_points);
        data.set_correction_points(correction_points);

        let attribute_count = non_negative("attribute_count", msg.read_i16()?.into())?;
        for _ in 0..attribute_count {
            let id = non_negative("attribute_id", msg.read_i16()?.into())?;
            let base = f64::from(msg.read_i32()?) / crate::config::GameConfig::FIXED_POINT_SCALE;
            data.set_attribute_base(AttributeId(id as u16), base)?;
        }

        let map = non_negative("map", msg.read_i16()?.into())?;
        let x = msg.read_i16()?;
        let y = msg.read_i16()?;
        data.set_location(map as MapId, Position::new(x.into(), y.into()))?;

        let kill_entries = non_negative("kill_entries", msg.read_i16()?.into())?;
        for _ in 0..kill_entries {
            let monster = non_negative("monster", msg.read_i16()?.into())?;
            let count = non_negative("kill_count", msg.read_i32()?.into())?;
            data.set_kill_count(monster as MonsterTypeId, count);
        }

        let ability_count = non_negative("ability_count", msg.read_i16()?.into())?;
        for _ in 0..ability_count {
            let id = msg.read_i8()? as u8;
            data.give_ability(AbilityId(id))?;
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, ConstructionError> {
    u32::try_from(value).map_err(|_| ConstructionError::InvalidValue { field, value })
}
