//! The player-controlled character.
//!
//! [`Character`] composes the entity's components with the per-character
//! state that only players have: the progression ledger, the transaction
//! coordinator, kill counts, the NPC dialogue and the dirty sets mirrored to
//! the owning client once per tick.
//!
//! Component and ledger mutations never talk to the client directly. They
//! leave signals behind which [`Character::update`] absorbs into the dirty
//! sets before flushing them.

pub mod construct;
pub mod context;
pub mod dialogue;
pub mod kills;
pub mod lifecycle;
pub mod progression;
pub mod transaction;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

pub use construct::{CharacterData, CharacterDeserializer, ConstructionError, StandardCharacterData};
pub use context::CharacterContext;
pub use dialogue::{NpcDialogue, NpcId};
pub use kills::{KillCounts, MonsterTypeId};
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleState};
pub use progression::{AttribmodResponse, ProgressionLedger};
pub use transaction::{BuySellSession, TradeSession, TransactionCoordinator, TransactionKind};

use crate::ability::{AbilityComponent, AbilityDenied, AbilityId, AbilitySignal};
use crate::attribute::{AttributeId, AttributeScopes, AttributeStore, Modifier, ModifierSource};
use crate::entity::{ActorComponent, BeingComponent, Entity, EntityId, MapId, Position};
use crate::env::{ClientSink, WorldEffects};
use crate::script::{ScriptThread, ThreadStatus};
use crate::sync::{DirtySets, MessageId, MessageIn, MessageOut, SyncChannels, SyncSource};

/// What happened to a character whose client went away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Disconnect {
    /// It was dead and has been respawned; its warp is queued.
    Respawned,
    /// It was alive and its removal from the world is queued.
    Removed,
}

pub struct Character {
    database_id: i32,
    entity: Entity,
    context: CharacterContext,
    client: Option<Box<dyn ClientSink>>,
    connected: bool,
    transactions: TransactionCoordinator,
    ledger: ProgressionLedger,
    kills: KillCounts,
    dirty: DirtySets,
    dialogue: Option<NpcDialogue>,
}

impl Character {
    /// Builds a character from the login message: database id, name, then the
    /// payload read by `deserializer`.
    ///
    /// Every attribute is recalculated and every attribute and ability is
    /// queued for the first sync.
    ///
    /// # Errors
    ///
    /// Any malformed or unknown data aborts construction.
    pub fn from_message(
        id: EntityId,
        context: CharacterContext,
        msg: &mut MessageIn<'_>,
        deserializer: &dyn CharacterDeserializer,
        client: Option<Box<dyn ClientSink>>,
    ) -> Result<Self, ConstructionError> {
        let database_id = msg.read_i32()?;
        let name = msg.read_string()?;

        let attributes =
            AttributeStore::for_scope(Arc::clone(&context.registry), AttributeScopes::CHARACTER);
        debug!(
            attributes = attributes.len(),
            "character creation: initialising attributes"
        );
        let respawn = context.config.respawn;
        let entity = Entity::new(id)
            .with(BeingComponent::new(name, attributes))
            .with(ActorComponent::new(
                respawn.map,
                Position::new(respawn.x, respawn.y),
            ))
            .with(AbilityComponent::new(Arc::clone(&context.abilities)));

        let mut character = Self {
            database_id,
            entity,
            context,
            client,
            connected: true,
            transactions: TransactionCoordinator::new(),
            ledger: ProgressionLedger::default(),
            kills: KillCounts::default(),
            dirty: DirtySets::new(),
            dialogue: None,
        };

        let mut data = CharacterData {
            entity: &mut character.entity,
            ledger: &mut character.ledger,
            kills: &mut character.kills,
        };
        deserializer.deserialize(&mut data, msg)?;

        // Loaded values are not changes; the full resync below covers them.
        being_mut(&mut character.entity).take_changed();
        abilities_mut(&mut character.entity).drain_signals();

        character.modified_all_attributes();
        let possessed: Vec<AbilityId> = abilities(&character.entity)
            .abilities()
            .map(|(id, _)| id)
            .collect();
        for ability in possessed {
            character.dirty.mark_ability(ability);
        }

        Ok(character)
    }

    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    pub fn database_id(&self) -> i32 {
        self.database_id
    }

    pub fn name(&self) -> &str {
        being(&self.entity).name()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    pub fn context(&self) -> &CharacterContext {
        &self.context
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn position(&self) -> (MapId, Position) {
        let actor = actor(&self.entity);
        (actor.map, actor.position)
    }

    // ===== per-tick =====

    /// Advances ability timers.
    pub fn tick(&mut self, elapsed: Duration) {
        abilities_mut(&mut self.entity).tick(elapsed);
    }

    /// Sends pending ability, cooldown and point changes. Dead characters
    /// send nothing.
    pub fn update(&mut self) {
        self.absorb_signals();
        if self.is_dead() {
            return;
        }
        self.flush(SyncChannels::CHARACTER_STATUS);
    }

    /// Sends pending attribute changes.
    pub fn send_status(&mut self) {
        self.absorb_signals();
        self.flush(SyncChannels::ATTRIBUTES);
    }

    /// Channels holding unsent changes, counting signals not yet absorbed.
    pub fn pending_sync(&mut self) -> SyncChannels {
        self.absorb_signals();
        self.dirty.pending()
    }

    /// Recalculates every attribute and queues all of them for sync.
    pub fn modified_all_attributes(&mut self) {
        debug!("marking all attributes as changed, requiring recalculation");
        let being = being_mut(&mut self.entity);
        let ids: Vec<AttributeId> = being.attributes().ids().collect();
        for id in ids {
            being.recalculate(id);
            self.dirty.mark_attribute(id);
        }
        // Recalculation itself is not a persisted change.
        being.take_changed();
    }

    // ===== attributes =====

    pub fn attribute_base(&self, id: AttributeId) -> Option<f64> {
        being(&self.entity).attribute_base(id)
    }

    pub fn modified_attribute(&self, id: AttributeId) -> Option<f64> {
        being(&self.entity).modified_attribute(id)
    }

    /// Returns `false`, changing nothing, for attributes outside the
    /// character scope.
    pub fn set_attribute_base(&mut self, id: AttributeId, value: f64) -> bool {
        being_mut(&mut self.entity).set_attribute(id, value)
    }

    pub fn add_attribute_modifier(
        &mut self,
        id: AttributeId,
        source: ModifierSource,
        modifier: Modifier,
    ) {
        being_mut(&mut self.entity).add_modifier(id, source, modifier);
    }

    pub fn remove_attribute_modifier(&mut self, id: AttributeId, source: ModifierSource) {
        being_mut(&mut self.entity).remove_modifier(id, source);
    }

    // ===== progression =====

    pub fn attribute_points(&self) -> u32 {
        self.ledger.attribute_points()
    }

    pub fn correction_points(&self) -> u32 {
        self.ledger.correction_points()
    }

    pub fn set_attribute_points(&mut self, points: u32) {
        self.ledger.set_attribute_points(points);
    }

    pub fn set_correction_points(&mut self, points: u32) {
        self.ledger.set_correction_points(points);
    }

    pub fn use_character_point(&mut self, attribute: AttributeId) -> AttribmodResponse {
        self.ledger
            .use_character_point(being_mut(&mut self.entity), attribute)
    }

    pub fn use_correction_point(&mut self, attribute: AttributeId) -> AttribmodResponse {
        self.ledger
            .use_correction_point(being_mut(&mut self.entity), attribute)
    }

    // ===== abilities =====

    pub fn activate_ability(&mut self, id: AbilityId) -> Result<(), AbilityDenied> {
        abilities_mut(&mut self.entity)
            .activate(id)
            .inspect_err(|denied| {
                warn!(character = %self.database_id, %denied, "ability activation denied");
            })
    }

    pub fn give_ability(&mut self, id: AbilityId) -> bool {
        abilities_mut(&mut self.entity).give(id)
    }

    pub fn take_ability(&mut self, id: AbilityId) -> bool {
        abilities_mut(&mut self.entity).take(id)
    }

    pub fn has_ability(&self, id: AbilityId) -> bool {
        abilities(&self.entity).has(id)
    }

    pub fn global_cooldown(&self) -> Duration {
        abilities(&self.entity).global_cooldown()
    }

    // ===== transactions =====

    pub fn transaction_kind(&self) -> TransactionKind {
        self.transactions.kind()
    }

    pub fn set_trading(&mut self, trade: Option<&Arc<dyn TradeSession>>) {
        self.transactions.set_trading(trade);
    }

    pub fn set_buy_sell(&mut self, session: Option<&Arc<dyn BuySellSession>>) {
        self.transactions.set_buy_sell(session);
    }

    pub fn cancel_transaction(&mut self) {
        self.transactions.cancel();
    }

    pub fn trading(&self) -> Option<Arc<dyn TradeSession>> {
        self.transactions.trading()
    }

    pub fn buy_sell(&self) -> Option<Arc<dyn BuySellSession>> {
        self.transactions.buy_sell()
    }

    // ===== kills =====

    pub fn increment_kill_count(&mut self, monster: MonsterTypeId) {
        self.kills.increment(monster);
    }

    pub fn kill_count(&self, monster: MonsterTypeId) -> u32 {
        self.kills.get(monster)
    }

    pub fn kill_counts(&self) -> &KillCounts {
        &self.kills
    }

    // ===== lifecycle =====

    pub fn lifecycle_state(&self) -> LifecycleState {
        being(&self.entity).lifecycle().state()
    }

    pub fn is_dead(&self) -> bool {
        being(&self.entity).is_dead()
    }

    /// Lowers HP by `amount`, never below zero. Reaching zero kills the
    /// character.
    pub fn apply_damage(&mut self, amount: f64) {
        if self.is_dead() {
            return;
        }
        let being = being_mut(&mut self.entity);
        let Some(hp) = being.attribute_base(AttributeId::HP) else {
            return;
        };
        let remaining = (hp - amount.max(0.0)).max(0.0);
        being.set_attribute(AttributeId::HP, remaining);
        if remaining <= 0.0 {
            // Checked alive above.
            let _ = self.die();
        }
    }

    /// Enters the dead state and runs the death callback.
    pub fn die(&mut self) -> Result<(), LifecycleError> {
        being_mut(&mut self.entity).lifecycle_mut().die()?;
        self.on_death();
        Ok(())
    }

    fn on_death(&mut self) {
        self.context.callbacks.death(&mut self.entity);
    }

    /// Brings a dead character back.
    ///
    /// A registered death-accepted callback may take over entirely. Otherwise
    /// HP is restored to its maximum and a warp to the configured respawn
    /// point is queued.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotDead`] if the character is alive; nothing changes.
    pub fn respawn(&mut self, world: &mut dyn WorldEffects) -> Result<(), LifecycleError> {
        let being = being_mut(&mut self.entity);
        if let Err(error) = being.lifecycle_mut().revive() {
            warn!(character = being.name(), "tried to respawn without being dead");
            return Err(error);
        }

        if self.context.callbacks.death_accepted(&mut self.entity) {
            return Ok(());
        }

        let being = being_mut(&mut self.entity);
        if let Some(max_hp) = being.modified_attribute(AttributeId::MAX_HP) {
            being.set_attribute(AttributeId::HP, max_hp);
        }
        let respawn = self.context.config.respawn;
        world.enqueue_warp(
            self.entity.id(),
            respawn.map,
            Position::new(respawn.x, respawn.y),
        );
        Ok(())
    }

    // ===== connection =====

    pub fn trigger_login_callback(&mut self) {
        self.context.callbacks.login(&mut self.entity);
    }

    /// Handles loss of the client. Dead characters respawn so that none is
    /// persisted dead; living ones are queued for removal.
    pub fn disconnected(&mut self, world: &mut dyn WorldEffects) -> Disconnect {
        self.connected = false;
        self.client = None;
        self.dialogue = None;
        self.transactions.cancel();

        if self.is_dead() {
            // Dead, so reviving cannot fail.
            let _ = self.respawn(world);
            Disconnect::Respawned
        } else {
            world.enqueue_removal(self.entity.id());
            Disconnect::Removed
        }
    }

    // ===== NPC dialogue =====

    /// Replaces any running dialogue with `thread` and runs it.
    pub fn start_npc_thread(&mut self, thread: Box<dyn ScriptThread>, npc: NpcId) {
        self.dialogue = Some(NpcDialogue { thread, npc });
        self.resume_npc_thread();
    }

    /// Continues the running dialogue. A finished dialogue closes the NPC
    /// window on the client.
    ///
    /// # Panics
    ///
    /// If the character has no running dialogue.
    pub fn resume_npc_thread(&mut self) {
        let dialogue = self
            .dialogue
            .as_mut()
            .expect("resumed an NPC thread the character does not own");

        if dialogue.thread.resume(&mut self.entity) == ThreadStatus::Finished {
            let npc = dialogue.npc;
            self.dialogue = None;
            let mut msg = MessageOut::new(MessageId::NpcClose);
            msg.write_i16(npc as i16);
            self.send(msg);
        }
    }

    pub fn talking_to_npc(&self) -> Option<NpcId> {
        self.dialogue.as_ref().map(NpcDialogue::npc)
    }

    // ===== sync plumbing =====

    fn absorb_signals(&mut self) {
        let accounts = &self.context.accounts;
        let being = being_mut(&mut self.entity);
        for id in being.take_changed() {
            if let Some(record) = being.attributes().get(id) {
                accounts.update_attribute(self.database_id, id, record.base(), record.modified());
            }
            self.dirty.mark_attribute(id);
        }

        for signal in abilities_mut(&mut self.entity).drain_signals() {
            match signal {
                AbilitySignal::Changed(id) => self.dirty.mark_ability(id),
                AbilitySignal::GlobalCooldownActivated => self.dirty.mark_cooldown(),
            }
        }

        if self.ledger.take_changed() {
            self.dirty.mark_points_status();
        }
    }

    fn flush(&mut self, channels: SyncChannels) {
        let view = StatusView {
            entity: &self.entity,
            ledger: &self.ledger,
        };
        for message in self.dirty.flush(&view, channels) {
            self.send(message);
        }
    }

    fn send(&mut self, message: MessageOut) {
        match self.client.as_mut() {
            Some(client) => client.send(message),
            None => debug!(id = ?message.id(), "dropping message for detached character"),
        }
    }
}

impl std::fmt::Debug for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Character")
            .field("database_id", &self.database_id)
            .field("entity", &self.entity)
            .field("connected", &self.connected)
            .field("transaction", &self.transactions.kind())
            .field("ledger", &self.ledger)
            .field("dialogue", &self.dialogue)
            .finish_non_exhaustive()
    }
}

struct StatusView<'a> {
    entity: &'a Entity,
    ledger: &'a ProgressionLedger,
}

impl SyncSource for StatusView<'_> {
    fn attribute(&self, id: AttributeId) -> Option<(f64, f64)> {
        let record = being(self.entity).attributes().get(id)?;
        Some((record.base(), record.modified()))
    }

    fn ability_recharge(&self, id: AbilityId) -> Option<Duration> {
        abilities(self.entity).get(id).map(|record| record.recharge_remaining)
    }

    fn global_cooldown(&self) -> Duration {
        abilities(self.entity).global_cooldown()
    }

    fn points(&self) -> (u32, u32) {
        (self.ledger.attribute_points(), self.ledger.correction_points())
    }
}

// A character entity is always built with these components; a missing one is
// a construction bug.

fn being(entity: &Entity) -> &BeingComponent {
    entity
        .get::<BeingComponent>()
        .expect("character entity carries a being component")
}

fn being_mut(entity: &mut Entity) -> &mut BeingComponent {
    entity
        .get_mut::<BeingComponent>()
        .expect("character entity carries a being component")
}

fn actor(entity: &Entity) -> &ActorComponent {
    entity
        .get::<ActorComponent>()
        .expect("character entity carries an actor component")
}

fn abilities(entity: &Entity) -> &AbilityComponent {
    entity
        .get::<AbilityComponent>()
        .expect("character entity carries an ability component")
}

fn abilities_mut(entity: &mut Entity) -> &mut AbilityComponent {
    entity
        .get_mut::<AbilityComponent>()
        .expect("character entity carries an ability component")
}
