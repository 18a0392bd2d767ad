use crate::state::{ActorId, EntityId, Position, UnitTypeId};

use super::ActionKind;

/// Who produced an intent.
///
/// Only [`IntentOrigin::Actor`] intents are subject to turn and budget gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IntentOrigin {
    /// Submitted by a player or AI seat.
    Actor,
    /// Follow-up scheduled by a resolved plan.
    Chain,
    /// Reactive follow-up that jumps ahead of queued work (counter attacks).
    Reaction,
    /// Turn control and scheduled map events.
    System,
}

/// Kind-specific request parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum IntentPayload {
    StartTurn,
    EndTurn,
    Move {
        entity: EntityId,
        target: Position,
    },
    Attack {
        entity: EntityId,
        target: EntityId,
        /// Pre-seeded variance roll in percent (0..=100).
        roll: u8,
    },
    Death {
        entity: EntityId,
    },
    Spawn {
        owner: ActorId,
        unit_type: UnitTypeId,
        position: Position,
    },
    Surrender {
        actor: ActorId,
    },
}

impl IntentPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::StartTurn => ActionKind::StartTurn,
            Self::EndTurn => ActionKind::EndTurn,
            Self::Move { .. } => ActionKind::Move,
            Self::Attack { .. } => ActionKind::Attack,
            Self::Death { .. } => ActionKind::Death,
            Self::Spawn { .. } => ActionKind::Spawn,
            Self::Surrender { .. } => ActionKind::Surrender,
        }
    }
}

/// Raw, unvalidated request to perform an action.
///
/// Consumed by [`ActionQueue::create_execution_plan`](super::ActionQueue::create_execution_plan)
/// and discarded once a plan has been resolved from it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionIntent {
    pub actor: Option<ActorId>,
    pub origin: IntentOrigin,
    pub payload: IntentPayload,
}

impl ActionIntent {
    pub fn new(actor: Option<ActorId>, origin: IntentOrigin, payload: IntentPayload) -> Self {
        Self {
            actor,
            origin,
            payload,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    // ===== player requests =====

    pub fn move_unit(actor: ActorId, entity: EntityId, target: Position) -> Self {
        Self::new(
            Some(actor),
            IntentOrigin::Actor,
            IntentPayload::Move { entity, target },
        )
    }

    pub fn attack(actor: ActorId, entity: EntityId, target: EntityId, roll: u8) -> Self {
        Self::new(
            Some(actor),
            IntentOrigin::Actor,
            IntentPayload::Attack {
                entity,
                target,
                roll,
            },
        )
    }

    pub fn end_turn(actor: ActorId) -> Self {
        Self::new(Some(actor), IntentOrigin::Actor, IntentPayload::EndTurn)
    }

    pub fn surrender(actor: ActorId) -> Self {
        Self::new(
            Some(actor),
            IntentOrigin::Actor,
            IntentPayload::Surrender { actor },
        )
    }

    // ===== system requests =====

    pub fn start_turn() -> Self {
        Self::system(IntentPayload::StartTurn)
    }

    pub fn spawn(owner: ActorId, unit_type: UnitTypeId, position: Position) -> Self {
        Self::system(IntentPayload::Spawn {
            owner,
            unit_type,
            position,
        })
    }

    pub fn system(payload: IntentPayload) -> Self {
        Self::new(None, IntentOrigin::System, payload)
    }

    // ===== follow-ups =====

    pub fn chained(payload: IntentPayload) -> Self {
        Self::new(None, IntentOrigin::Chain, payload)
    }

    pub fn reaction(payload: IntentPayload) -> Self {
        Self::new(None, IntentOrigin::Reaction, payload)
    }

    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Reactions are queued ahead of already pending work.
    pub fn is_immediate(&self) -> bool {
        self.origin == IntentOrigin::Reaction
    }

    pub fn is_from_actor(&self) -> bool {
        self.origin == IntentOrigin::Actor
    }
}
