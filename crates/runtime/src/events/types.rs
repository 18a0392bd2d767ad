//! Event types for different topics.

use game_core::{ActorId, Denial, EventId};
use serde::Serialize;

/// Server-side pipeline events.
#[derive(Debug, Clone, Serialize)]
pub enum MatchEvent {
    /// A batch left the server.
    BatchBroadcast {
        plans: usize,
        events: Vec<EventId>,
        nonce: u64,
    },

    /// A submitted or scheduled intent did not validate.
    IntentDenied(Denial),
}

/// Turn lifecycle, derived from committed plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TurnEvent {
    TurnStarted {
        actor: ActorId,
        turn: u32,
        round: u32,
    },
    TurnEnded {
        actor: ActorId,
    },
    ActorDefeated {
        actor: ActorId,
    },
}

/// Client replay progress.
#[derive(Debug, Clone, Serialize)]
pub enum ReplayEvent {
    BatchAccepted { client: usize, plans: usize },

    /// The client refused a batch and stopped.
    Desync { client: usize, reason: String },
}
