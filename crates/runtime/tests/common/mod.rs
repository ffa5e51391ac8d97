#![allow(dead_code)]

use std::time::Duration;

use game_core::{
    AbilityCatalog, AbilityId, AbilityInfo, AttributeBounds, AttributeId, AttributeInfo,
    AttributeRegistry, AttributeScopes, DerivationTerm, MessageId, MessageOut,
};

pub const STR: AttributeId = AttributeId(1);
pub const VIT: AttributeId = AttributeId(2);
pub const HEAL: AbilityId = AbilityId(1);

pub fn registry() -> AttributeRegistry {
    let scope = AttributeScopes::CHARACTER;
    AttributeRegistry::new([
        AttributeInfo::new(STR, "strength", scope).modifiable(),
        AttributeInfo::new(VIT, "vitality", scope).modifiable(),
        AttributeInfo::new(AttributeId::HP, "hp", scope)
            .bounded(AttributeBounds::new(0.0, f64::MAX))
            .with_default_base(100.0),
        AttributeInfo::new(AttributeId::MAX_HP, "max_hp", scope)
            .derived([DerivationTerm::new(VIT, 10.0)])
            .with_default_base(50.0),
    ])
    .expect("valid registry")
}

pub fn abilities() -> AbilityCatalog {
    AbilityCatalog::new([AbilityInfo::new(HEAL, "heal", Duration::from_millis(3000))])
}

/// Login payload for a character standing on map 2 at (100, 200) with HEAL.
pub fn login_payload(database_id: i32, name: &str) -> Vec<u8> {
    let mut out = MessageOut::new(MessageId::PlayerAttributeChange);
    out.write_i32(database_id).write_string(name);
    out.write_i16(3).write_i16(1);
    out.write_i16(2)
        .write_i16(STR.0 as i16)
        .write_i32(5 * 256)
        .write_i16(VIT.0 as i16)
        .write_i32(5 * 256);
    out.write_i16(2).write_i16(100).write_i16(200);
    out.write_i16(0);
    out.write_i16(1).write_i8(HEAL.0 as i8);
    out.payload().to_vec()
}
