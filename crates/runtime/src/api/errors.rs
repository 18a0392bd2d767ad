//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, routers, and the transport so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ActorId, Rejection};

use crate::router::{PredictError, ReplayError, SubmitError};
use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("server worker command channel closed")]
    CommandChannelClosed,

    #[error("worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("intent rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("prediction refused: {0}")]
    Predict(#[from] PredictError),

    /// Fatal to the client session that raised it.
    #[error("replay desync: {0}")]
    Desync(#[from] ReplayError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("runtime requires an initial state")]
    MissingState,

    #[error("no intent provider registered for actor {0}")]
    ProviderNotSet(ActorId),

    #[error("intent provider for actor {actor} failed: {reason}")]
    Provider { actor: ActorId, reason: String },

    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
}
