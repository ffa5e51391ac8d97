//! Activatable abilities with per-ability recharge and a shared global cooldown.

pub mod catalog;
pub mod store;

pub use catalog::{AbilityCatalog, AbilityId, AbilityInfo};
pub use store::{AbilityComponent, AbilityDenied, AbilityRecord, AbilitySignal};
