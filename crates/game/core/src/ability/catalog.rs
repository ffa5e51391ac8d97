use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Identifier of an ability definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(pub u8);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// Static definition of an ability.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityInfo {
    pub id: AbilityId,
    pub name: String,
    /// Time before the ability can be used again after activation.
    pub recharge: Duration,
}

impl AbilityInfo {
    pub fn new(id: AbilityId, name: impl Into<String>, recharge: Duration) -> Self {
        Self {
            id,
            name: name.into(),
            recharge,
        }
    }
}

/// Process-wide ability definitions, shared read-only by every entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityCatalog {
    abilities: BTreeMap<AbilityId, AbilityInfo>,
    global_cooldown: Duration,
}

impl AbilityCatalog {
    pub const DEFAULT_GLOBAL_COOLDOWN: Duration = Duration::from_millis(1000);

    pub fn new(abilities: impl IntoIterator<Item = AbilityInfo>) -> Self {
        Self {
            abilities: abilities.into_iter().map(|info| (info.id, info)).collect(),
            global_cooldown: Self::DEFAULT_GLOBAL_COOLDOWN,
        }
    }

    /// Overrides the cooldown started by every activation.
    pub fn with_global_cooldown(mut self, global_cooldown: Duration) -> Self {
        self.global_cooldown = global_cooldown;
        self
    }

    pub fn get(&self, id: AbilityId) -> Option<&AbilityInfo> {
        self.abilities.get(&id)
    }

    pub fn contains(&self, id: AbilityId) -> bool {
        self.abilities.contains_key(&id)
    }

    pub fn global_cooldown(&self) -> Duration {
        self.global_cooldown
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityInfo> + '_ {
        self.abilities.values()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        Self::new([])
    }
}
