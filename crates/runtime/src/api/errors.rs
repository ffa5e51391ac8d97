//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, content loading and character
//! construction so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ConstructionError, EntityId, ErrorSeverity, GameError, LifecycleError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("character {0} is not in the simulation")]
    UnknownCharacter(EntityId),

    #[error("character construction failed")]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("runtime requires an attribute registry before building")]
    MissingAttributes,

    #[error(transparent)]
    Content(#[from] anyhow::Error),

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("failed to install the log subscriber")]
    Logging(#[source] tracing_subscriber::util::TryInitError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCharacter(_) => ErrorSeverity::Validation,
            Self::Construction(error) => error.severity(),
            Self::Lifecycle(error) => error.severity(),
            Self::MissingAttributes | Self::Content(_) | Self::Logging(_) => ErrorSeverity::Fatal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCharacter(_) => "RUNTIME_UNKNOWN_CHARACTER",
            Self::Construction(error) => error.error_code(),
            Self::Lifecycle(error) => error.error_code(),
            Self::MissingAttributes => "RUNTIME_MISSING_ATTRIBUTES",
            Self::Content(_) => "RUNTIME_CONTENT",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Logging(_) => "RUNTIME_LOGGING",
        }
    }
}
