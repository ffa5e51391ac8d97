//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the [`Simulation`](crate::Simulation) and
//! interleaves ticks with commands from [`RuntimeHandle`](crate::RuntimeHandle).

mod simulation;

pub use simulation::{Command, SimulationWorker};
