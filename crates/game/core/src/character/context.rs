use std::sync::Arc;

use crate::ability::AbilityCatalog;
use crate::attribute::AttributeRegistry;
use crate::config::GameConfig;
use crate::env::{AccountNotifier, NullAccountNotifier};
use crate::script::ScriptCallbacks;

/// Shared, read-only services every character of a server instance uses.
#[derive(Clone)]
pub struct CharacterContext {
    pub registry: Arc<AttributeRegistry>,
    pub abilities: Arc<AbilityCatalog>,
    pub callbacks: Arc<ScriptCallbacks>,
    pub config: Arc<GameConfig>,
    pub accounts: Arc<dyn AccountNotifier>,
}

impl CharacterContext {
    pub fn new(
        registry: Arc<AttributeRegistry>,
        abilities: Arc<AbilityCatalog>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            registry,
            abilities,
            callbacks: Arc::new(ScriptCallbacks::default()),
            config,
            accounts: Arc::new(NullAccountNotifier),
        }
    }

    pub fn with_callbacks(mut self, callbacks: ScriptCallbacks) -> Self {
        self.callbacks = Arc::new(callbacks);
        self
    }

    pub fn with_accounts(mut self, accounts: Arc<dyn AccountNotifier>) -> Self {
        self.accounts = accounts;
        self
    }
}

impl std::fmt::Debug for CharacterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterContext")
            .field("attributes", &self.registry.len())
            .field("abilities", &self.abilities.len())
            .field("callbacks", &self.callbacks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
