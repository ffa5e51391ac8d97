//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for hosts to admit and release characters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use game_content::ContentFactory;
use game_core::{
    AbilityCatalog, AccountNotifier, AttributeRegistry, CharacterContext, CharacterDeserializer,
    GameConfig, ScriptCallbacks, StandardCharacterData,
};

use crate::api::{Result, RuntimeError, RuntimeEvent, RuntimeHandle};
use crate::simulation::Simulation;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Simulation time advanced per tick.
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that hosts the character simulation
///
/// [`RuntimeHandle`] provides a cloneable façade for connection tasks.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.handle.subscribe_events()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every clone of the handle has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    attributes: Option<Arc<AttributeRegistry>>,
    abilities: Arc<AbilityCatalog>,
    callbacks: ScriptCallbacks,
    accounts: Option<Arc<dyn AccountNotifier>>,
    deserializer: Arc<dyn CharacterDeserializer + Send + Sync>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            attributes: None,
            abilities: Arc::new(AbilityCatalog::default()),
            callbacks: ScriptCallbacks::default(),
            accounts: None,
            deserializer: Arc::new(StandardCharacterData),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the attribute registry (required)
    pub fn attributes(mut self, registry: AttributeRegistry) -> Self {
        self.attributes = Some(Arc::new(registry));
        self
    }

    pub fn abilities(mut self, catalog: AbilityCatalog) -> Self {
        self.abilities = Arc::new(catalog);
        self
    }

    /// Load registries and game configuration from a data directory.
    pub fn content(mut self, factory: &ContentFactory) -> Result<Self> {
        self.config.game_config = factory.load_config()?;
        self.attributes = Some(Arc::new(factory.load_attributes()?));
        self.abilities = Arc::new(factory.load_abilities()?);
        Ok(self)
    }

    pub fn callbacks(mut self, callbacks: ScriptCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn accounts(mut self, accounts: Arc<dyn AccountNotifier>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Replace the login payload format.
    pub fn deserializer(
        mut self,
        deserializer: Arc<dyn CharacterDeserializer + Send + Sync>,
    ) -> Self {
        self.deserializer = deserializer;
        self
    }

    /// Build the runtime and spawn its worker on the current tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let attributes = self.attributes.ok_or(RuntimeError::MissingAttributes)?;

        let mut context = CharacterContext::new(
            attributes,
            self.abilities,
            Arc::new(self.config.game_config.clone()),
        )
        .with_callbacks(self.callbacks);
        if let Some(accounts) = self.accounts {
            context = context.with_accounts(accounts);
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (event_tx, _event_rx) =
            broadcast::channel::<RuntimeEvent>(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_tx.clone());

        let sim_worker = SimulationWorker::new(
            Simulation::with_deserializer(context, self.deserializer),
            self.config.tick_interval,
            command_rx,
            event_tx,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
