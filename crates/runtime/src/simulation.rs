//! The set of characters hosted by one game server, and its tick schedule.
//!
//! [`Simulation`] is synchronous and owns no I/O; the worker drives it from
//! an interval timer. Warps and removals requested during a tick are queued
//! and applied after every character has been updated.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use game_core::{
    ActorComponent, Character, CharacterContext, CharacterDeserializer, ClientSink, Disconnect,
    EntityId, MapId, MessageIn, Position, StandardCharacterData, WorldEffects,
};

use crate::api::{CharacterStatus, Result, RuntimeError, RuntimeEvent};

/// World effects collected during a tick.
#[derive(Debug, Default)]
pub struct WorldQueue {
    warps: Vec<(EntityId, MapId, Position)>,
    removals: Vec<EntityId>,
}

impl WorldQueue {
    pub fn is_empty(&self) -> bool {
        self.warps.is_empty() && self.removals.is_empty()
    }
}

impl WorldEffects for WorldQueue {
    fn enqueue_warp(&mut self, entity: EntityId, map: MapId, position: Position) {
        self.warps.push((entity, map, position));
    }

    fn enqueue_removal(&mut self, entity: EntityId) {
        self.removals.push(entity);
    }
}

pub struct Simulation {
    context: CharacterContext,
    deserializer: Arc<dyn CharacterDeserializer + Send + Sync>,
    characters: BTreeMap<EntityId, Character>,
    world: WorldQueue,
    next_id: u32,
}

impl Simulation {
    pub fn new(context: CharacterContext) -> Self {
        Self::with_deserializer(context, Arc::new(StandardCharacterData))
    }

    pub fn with_deserializer(
        context: CharacterContext,
        deserializer: Arc<dyn CharacterDeserializer + Send + Sync>,
    ) -> Self {
        Self {
            context,
            deserializer,
            characters: BTreeMap::new(),
            world: WorldQueue::default(),
            next_id: 1,
        }
    }

    /// Builds a character from its login payload, runs the login callback
    /// and adds it to the simulation.
    pub fn login(
        &mut self,
        payload: &[u8],
        client: Option<Box<dyn ClientSink>>,
    ) -> Result<EntityId> {
        let entity = EntityId(self.next_id);
        let mut character = Character::from_message(
            entity,
            self.context.clone(),
            &mut MessageIn::new(payload),
            self.deserializer.as_ref(),
            client,
        )?;
        self.next_id += 1;

        character.trigger_login_callback();
        info!(
            %entity,
            database_id = character.database_id(),
            name = character.name(),
            "character entered the simulation"
        );
        self.characters.insert(entity, character);
        Ok(entity)
    }

    /// Handles a lost client. Dead characters are respawned first; either
    /// way the character leaves at the end of the current tick.
    pub fn disconnect(&mut self, entity: EntityId) -> Result<Disconnect> {
        let character = self
            .characters
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownCharacter(entity))?;
        let outcome = character.disconnected(&mut self.world);
        if outcome == Disconnect::Respawned {
            self.world.enqueue_removal(entity);
        }
        debug!(%entity, %outcome, "character disconnected");
        Ok(outcome)
    }

    /// Respawns a dead character on request of its client.
    pub fn respawn(&mut self, entity: EntityId) -> Result<()> {
        let character = self
            .characters
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownCharacter(entity))?;
        character.respawn(&mut self.world)?;
        Ok(())
    }

    /// One simulation step: ability timers, character status, attribute
    /// status, then queued world effects. Returns removal events.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<RuntimeEvent> {
        for character in self.characters.values_mut() {
            character.tick(elapsed);
        }
        for character in self.characters.values_mut() {
            character.update();
        }
        for character in self.characters.values_mut() {
            character.send_status();
        }
        self.apply_world_effects()
    }

    fn apply_world_effects(&mut self) -> Vec<RuntimeEvent> {
        let WorldQueue { warps, removals } = std::mem::take(&mut self.world);

        for (entity, map, position) in warps {
            let Some(actor) = self
                .characters
                .get_mut(&entity)
                .and_then(|character| character.entity_mut().get_mut::<ActorComponent>())
            else {
                warn!(%entity, "dropping warp for an entity that left");
                continue;
            };
            actor.map = map;
            actor.position = position;
            debug!(%entity, map, x = position.x, y = position.y, "warped");
        }

        let mut events = Vec::with_capacity(removals.len());
        for entity in removals {
            let Some(character) = self.characters.remove(&entity) else {
                continue;
            };
            let (map, position) = character.position();
            info!(%entity, database_id = character.database_id(), "character left the simulation");
            events.push(RuntimeEvent::Removed {
                entity,
                database_id: character.database_id(),
                map,
                position,
            });
        }
        events
    }

    pub fn character(&self, entity: EntityId) -> Option<&Character> {
        self.characters.get(&entity)
    }

    pub fn character_mut(&mut self, entity: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&entity)
    }

    pub fn status(&self, entity: EntityId) -> Option<CharacterStatus> {
        let character = self.characters.get(&entity)?;
        let (map, position) = character.position();
        Some(CharacterStatus {
            entity,
            database_id: character.database_id(),
            name: character.name().to_owned(),
            lifecycle: character.lifecycle_state(),
            map,
            position,
            attribute_points: character.attribute_points(),
            correction_points: character.correction_points(),
        })
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
