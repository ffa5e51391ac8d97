//! Per-tick simulation core for player characters.
//!
//! `game-core` owns the rules a character obeys between two network ticks:
//! attribute derivation, ability timers, exclusive transactions, progression
//! points and the alive/dead cycle. State changes are collected in dirty sets
//! and turned into outbound messages once per tick by
//! [`Character::update`](character::Character::update) and
//! [`Character::send_status`](character::Character::send_status).
//!
//! Nothing here performs I/O. The host supplies the collaborators in
//! [`env`] and [`script`] and drives the tick.
pub mod ability;
pub mod attribute;
pub mod character;
pub mod config;
pub mod entity;
pub mod env;
pub mod error;
pub mod script;
pub mod sync;

pub use ability::{
    AbilityCatalog, AbilityComponent, AbilityDenied, AbilityId, AbilityInfo, AbilityRecord,
    AbilitySignal,
};
pub use attribute::{
    AttributeBounds, AttributeId, AttributeInfo, AttributeRegistry, AttributeScopes,
    AttributeStore, Derivation, DerivationTerm, Modifier, ModifierSource, ModifierStack,
    RegistryError,
};
pub use character::{
    AttribmodResponse, BuySellSession, Character, CharacterContext, CharacterData,
    CharacterDeserializer, ConstructionError, Disconnect, KillCounts, LifecycleError,
    LifecycleState, MonsterTypeId, NpcId, ProgressionLedger, StandardCharacterData,
    TradeSession, TransactionCoordinator, TransactionKind,
};
pub use config::{GameConfig, RespawnPoint};
pub use entity::{
    ActorComponent, BeingComponent, Component, ComponentKind, Entity, EntityId, MapId, Position,
};
pub use env::{AccountNotifier, ClientSink, NullAccountNotifier, WorldEffects};
pub use error::{ErrorSeverity, GameError};
pub use script::{ScriptCallbacks, ScriptThread, ThreadStatus};
pub use sync::{DirtySets, MessageId, MessageIn, MessageOut, SyncChannels, SyncSource, WireError};
