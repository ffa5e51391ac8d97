//! Entities as bags of independently attachable capabilities.
//!
//! An [`Entity`] owns at most one component per [`ComponentKind`]. Code that
//! needs a capability asks for it by type and handles its absence explicitly;
//! there is no inheritance between capabilities.

mod actor;
mod being;

pub use actor::{ActorComponent, MapId, Position};
pub use being::BeingComponent;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier of an entity in the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability tags. Each tag indexes exactly one component slot.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ComponentKind {
    /// Name, lifecycle and attributes.
    Being,
    /// Map placement.
    Actor,
    /// Abilities and cooldowns.
    Ability,
}

/// A capability that can be attached to an [`Entity`].
pub trait Component: Any + Send + Sync {
    const KIND: ComponentKind;
}

/// Heterogeneous component registry keyed by [`ComponentKind`].
#[derive(Default)]
pub struct Entity {
    id: EntityId,
    components: BTreeMap<ComponentKind, Box<dyn Any + Send + Sync>>,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<T: Component>(mut self, component: T) -> Self {
        self.insert(component);
        self
    }

    /// Attaches `component`, returning the one it replaced.
    pub fn insert<T: Component>(&mut self, component: T) -> Option<T> {
        self.components
            .insert(T::KIND, Box::new(component))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    pub fn remove<T: Component>(&mut self) -> Option<T> {
        let component = self.components.remove(&T::KIND)?;
        component.downcast::<T>().ok().map(|component| *component)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components.get(&T::KIND)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.get_mut(&T::KIND)?.downcast_mut::<T>()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.keys().copied()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_are_queried_by_type() {
        let mut entity = Entity::new(EntityId(7)).with(ActorComponent::new(3, Position::new(1, 2)));

        assert!(entity.has::<ActorComponent>());
        assert!(!entity.has::<crate::ability::AbilityComponent>());
        assert!(entity.get::<BeingComponent>().is_none());

        entity.get_mut::<ActorComponent>().unwrap().position = Position::new(5, 5);
        assert_eq!(
            entity.get::<ActorComponent>().unwrap().position,
            Position::new(5, 5)
        );
    }

    #[test]
    fn insert_replaces_and_remove_detaches() {
        let mut entity = Entity::new(EntityId(1));

        assert!(entity.insert(ActorComponent::new(1, Position::ORIGIN)).is_none());
        let previous = entity.insert(ActorComponent::new(2, Position::ORIGIN));
        assert_eq!(previous.map(|actor| actor.map), Some(1));

        let removed = entity.remove::<ActorComponent>();
        assert_eq!(removed.map(|actor| actor.map), Some(2));
        assert_eq!(entity.kinds().count(), 0);
    }
}
