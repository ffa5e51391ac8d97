//! Simulation worker that owns the authoritative [`Simulation`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), ticks the
//! simulation on a fixed interval and broadcasts [`RuntimeEvent`]s.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use game_core::{ClientSink, Disconnect, EntityId};

use crate::api::{CharacterStatus, Result, RuntimeError, RuntimeEvent};
use crate::simulation::Simulation;

/// Commands that can be sent to the simulation worker
pub enum Command {
    Login {
        payload: Vec<u8>,
        client: Option<Box<dyn ClientSink>>,
        reply: oneshot::Sender<Result<EntityId>>,
    },
    Disconnect {
        entity: EntityId,
        reply: oneshot::Sender<Result<Disconnect>>,
    },
    Damage {
        entity: EntityId,
        amount: f64,
        reply: oneshot::Sender<Result<()>>,
    },
    Respawn {
        entity: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    Status {
        entity: EntityId,
        reply: oneshot::Sender<Option<CharacterStatus>>,
    },
}

/// Background task that ticks the simulation and processes commands.
pub struct SimulationWorker {
    simulation: Simulation,
    tick_interval: Duration,
    command_rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<RuntimeEvent>,
}

impl SimulationWorker {
    pub fn new(
        simulation: Simulation,
        tick_interval: Duration,
        command_rx: mpsc::Receiver<Command>,
        events: broadcast::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            simulation,
            tick_interval,
            command_rx,
            events,
        }
    }

    /// Main worker loop. Ends when every handle has been dropped.
    pub async fn run(mut self) {
        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock = TickClock::start();

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = interval.tick() => self.tick(clock.lap()),
            }
        }

        info!(characters = self.simulation.len(), "simulation worker stopped");
    }

    /// Advances the simulation by the wall-clock time since the previous
    /// tick, which exceeds the interval when ticks run late.
    fn tick(&mut self, elapsed: Duration) {
        for event in self.simulation.tick(elapsed) {
            self.publish(event);
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Login {
                payload,
                client,
                reply,
            } => {
                let result = self.simulation.login(&payload, client);
                let logged_in = result.as_ref().ok().and_then(|entity| {
                    let character = self.simulation.character(*entity)?;
                    Some(RuntimeEvent::LoggedIn {
                        entity: *entity,
                        database_id: character.database_id(),
                    })
                });
                if let Some(event) = logged_in {
                    self.publish(event);
                }
                if reply.send(result).is_err() {
                    debug!("Login reply channel closed (caller dropped)");
                }
            }
            Command::Disconnect { entity, reply } => {
                let result = self.simulation.disconnect(entity);
                if let Ok(outcome) = &result {
                    self.publish(RuntimeEvent::Disconnected {
                        entity,
                        outcome: *outcome,
                    });
                }
                if reply.send(result).is_err() {
                    debug!("Disconnect reply channel closed (caller dropped)");
                }
            }
            Command::Damage {
                entity,
                amount,
                reply,
            } => {
                let result = self
                    .simulation
                    .character_mut(entity)
                    .map(|character| character.apply_damage(amount))
                    .ok_or(RuntimeError::UnknownCharacter(entity));
                if reply.send(result).is_err() {
                    debug!("Damage reply channel closed (caller dropped)");
                }
            }
            Command::Respawn { entity, reply } => {
                let result = self.simulation.respawn(entity);
                if reply.send(result).is_err() {
                    debug!("Respawn reply channel closed (caller dropped)");
                }
            }
            Command::Status { entity, reply } => {
                if reply.send(self.simulation.status(entity)).is_err() {
                    debug!("Status reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn publish(&self, event: RuntimeEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Wall-clock time between ticks.
///
/// The interval reports the deadline it was scheduled for, not when it
/// actually fired, so lateness is measured here.
struct TickClock {
    last: Instant,
}

impl TickClock {
    fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }
}
