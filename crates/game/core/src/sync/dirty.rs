use std::collections::BTreeSet;
use std::time::Duration;

use bitflags::bitflags;

use super::message::{MessageId, MessageOut};
use crate::ability::AbilityId;
use crate::attribute::AttributeId;
use crate::config::GameConfig;

bitflags! {
    /// Outbound channels of the synchronizer.
    ///
    /// `ABILITY_COOLDOWN` and `POINTS_STATUS` double as the boolean dirty
    /// flags of their channel.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SyncChannels: u8 {
        const ABILITIES        = 1 << 0;
        const ABILITY_COOLDOWN = 1 << 1;
        const POINTS_STATUS    = 1 << 2;
        const ATTRIBUTES       = 1 << 3;

        /// Channels flushed by the character's per-tick update.
        const CHARACTER_STATUS = Self::ABILITIES.bits()
            | Self::ABILITY_COOLDOWN.bits()
            | Self::POINTS_STATUS.bits();
    }
}

/// Read access to the values a flush serializes.
pub trait SyncSource {
    /// `(base, modified)` of an attribute, or `None` if it no longer exists.
    fn attribute(&self, id: AttributeId) -> Option<(f64, f64)>;

    /// Remaining recharge of a possessed ability, `None` if it was removed.
    fn ability_recharge(&self, id: AbilityId) -> Option<Duration>;

    fn global_cooldown(&self) -> Duration;

    /// `(attribute_points, correction_points)`.
    fn points(&self) -> (u32, u32);
}

/// Changed entries awaiting the next flush.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtySets {
    attributes: BTreeSet<AttributeId>,
    abilities: BTreeSet<AbilityId>,
    flags: SyncChannels,
}

impl DirtySets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_attribute(&mut self, id: AttributeId) {
        self.attributes.insert(id);
    }

    pub fn mark_ability(&mut self, id: AbilityId) {
        self.abilities.insert(id);
    }

    pub fn mark_cooldown(&mut self) {
        self.flags |= SyncChannels::ABILITY_COOLDOWN;
    }

    pub fn mark_points_status(&mut self) {
        self.flags |= SyncChannels::POINTS_STATUS;
    }

    pub fn attributes(&self) -> &BTreeSet<AttributeId> {
        &self.attributes
    }

    pub fn abilities(&self) -> &BTreeSet<AbilityId> {
        &self.abilities
    }

    /// Channels that currently hold something to send.
    pub fn pending(&self) -> SyncChannels {
        let mut pending = self.flags;
        pending.set(SyncChannels::ATTRIBUTES, !self.attributes.is_empty());
        pending.set(SyncChannels::ABILITIES, !self.abilities.is_empty());
        pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Serializes and clears the requested channels.
    ///
    /// Channels are emitted in a fixed order: abilities, cooldown, points,
    /// attributes. A clean channel produces nothing. A dirty abilities set
    /// always produces a message, which is empty when every marked ability
    /// was taken away; the client reads that as the removal. Attributes that
    /// vanished from `source` are skipped, and an attribute message with no
    /// entries left is not sent.
    pub fn flush(&mut self, source: &dyn SyncSource, channels: SyncChannels) -> Vec<MessageOut> {
        let mut messages = Vec::new();

        if channels.contains(SyncChannels::ABILITIES) && !self.abilities.is_empty() {
            let mut msg = MessageOut::new(MessageId::AbilityStatus);
            for id in std::mem::take(&mut self.abilities) {
                let Some(remaining) = source.ability_recharge(id) else {
                    continue;
                };
                msg.write_i8(id.0 as i8).write_i32(saturate_i32(remaining));
            }
            messages.push(msg);
        }

        if channels.contains(SyncChannels::ABILITY_COOLDOWN)
            && self.flags.contains(SyncChannels::ABILITY_COOLDOWN)
        {
            let mut msg = MessageOut::new(MessageId::AbilityCooldown);
            msg.write_i16(saturate_i16(source.global_cooldown()));
            messages.push(msg);
            self.flags.remove(SyncChannels::ABILITY_COOLDOWN);
        }

        if channels.contains(SyncChannels::POINTS_STATUS)
            && self.flags.contains(SyncChannels::POINTS_STATUS)
        {
            let (attribute_points, correction_points) = source.points();
            let mut msg = MessageOut::new(MessageId::AttributePointsStatus);
            msg.write_i16(clamp_i16(attribute_points))
                .write_i16(clamp_i16(correction_points));
            messages.push(msg);
            self.flags.remove(SyncChannels::POINTS_STATUS);
        }

        if channels.contains(SyncChannels::ATTRIBUTES) && !self.attributes.is_empty() {
            let mut msg = MessageOut::new(MessageId::PlayerAttributeChange);
            for id in std::mem::take(&mut self.attributes) {
                let Some((base, modified)) = source.attribute(id) else {
                    continue;
                };
                msg.write_i16(id.0 as i16)
                    .write_i32(fixed_point(base))
                    .write_i32(fixed_point(modified));
            }
            if !msg.is_empty() {
                messages.push(msg);
            }
        }

        messages
    }
}

/// `value × 256`, truncated toward zero and saturated to `i32`.
pub fn fixed_point(value: f64) -> i32 {
    (value * GameConfig::FIXED_POINT_SCALE) as i32
}

fn saturate_i32(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

fn saturate_i16(duration: Duration) -> i16 {
    i16::try_from(duration.as_millis()).unwrap_or(i16::MAX)
}

fn clamp_i16(value: u32) -> i16 {
    i16::try_from(value).unwrap_or(i16::MAX)
}
