//! ALIVE/DEAD state machine.
//!
//! ```text
//!          die()
//!   Alive ───────▶ Dead
//!     ▲              │
//!     └──────────────┘
//!         revive()
//! ```

use crate::error::{ErrorSeverity, GameError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    #[default]
    Alive,
    Dead,
}

/// Rejected lifecycle transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("already dead")]
    AlreadyDead,

    #[error("not dead")]
    NotDead,
}

impl GameError for LifecycleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyDead => "LIFECYCLE_ALREADY_DEAD",
            Self::NotDead => "LIFECYCLE_NOT_DEAD",
        }
    }
}

/// Exactly one state per being; changes only through [`die`](Self::die) and
/// [`revive`](Self::revive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == LifecycleState::Dead
    }

    pub fn die(&mut self) -> Result<(), LifecycleError> {
        if self.is_dead() {
            return Err(LifecycleError::AlreadyDead);
        }
        self.state = LifecycleState::Dead;
        Ok(())
    }

    pub fn revive(&mut self) -> Result<(), LifecycleError> {
        if !self.is_dead() {
            return Err(LifecycleError::NotDead);
        }
        self.state = LifecycleState::Alive;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_alive_and_round_trips() {
        let mut lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.state(), LifecycleState::Alive);

        assert_eq!(lifecycle.revive(), Err(LifecycleError::NotDead));
        lifecycle.die().unwrap();
        assert_eq!(lifecycle.die(), Err(LifecycleError::AlreadyDead));
        assert!(lifecycle.is_dead());
        lifecycle.revive().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Alive);
    }

    #[test]
    fn states_display_in_upper_case() {
        assert_eq!(LifecycleState::Dead.to_string(), "DEAD");
    }
}
