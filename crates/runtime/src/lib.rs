//! Host layer for the per-tick character simulation.
//!
//! This crate wires [`game_core::Character`] into a tokio process: a worker
//! owns the [`Simulation`] and ticks it on a fixed interval, while connection
//! tasks talk to it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`simulation`] is the synchronous tick schedule
//! - [`session`] adapts tokio channels to the core's collaborator traits
//! - [`logging`] installs the log subscriber
pub mod api;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod simulation;

mod workers;

pub use api::{CharacterStatus, Result, RuntimeError, RuntimeEvent, RuntimeHandle};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::{AttributeUpdate, ChannelAccounts, ChannelClient};
pub use simulation::{Simulation, WorldQueue};
