//! Intent rejection.
//!
//! A rejection is an ordinary value returned from resolution. It never aborts
//! the pipeline: the intent is dropped and, where a caller cares, surfaced as
//! a [`Denial`].

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActorId, EntityId, Position, UnitTypeId};

use super::{ActionIntent, ActionKind};

/// Why an intent did not resolve into a plan.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    // ===== gating =====
    #[error("actor-originated intent names no actor")]
    MissingActor,

    #[error("{0} is not seated")]
    UnknownActor(ActorId),

    #[error("{0} has been defeated")]
    ActorDefeated(ActorId),

    #[error("it is not {0}'s turn")]
    NotYourTurn(ActorId),

    #[error("{actor} does not own {entity}")]
    NotOwner { actor: ActorId, entity: EntityId },

    #[error("{0} has no actions left this turn")]
    NoActionsLeft(ActorId),

    #[error("{0} may only be requested by the system")]
    NotPermitted(ActionKind),

    // ===== turn control =====
    #[error("a turn is already in progress")]
    TurnInProgress,

    #[error("no turn is open")]
    NoTurnOpen,

    #[error("no actor is able to take a turn")]
    NoActors,

    // ===== board =====
    #[error("{0} does not exist")]
    UnknownEntity(EntityId),

    #[error("unit type {0:?} is not registered")]
    UnknownUnitType(UnitTypeId),

    #[error("{0} is outside the map")]
    OutOfBounds(Position),

    #[error("{0} is not passable")]
    Blocked(Position),

    #[error("{position} is occupied by {occupant}")]
    Occupied {
        position: Position,
        occupant: EntityId,
    },

    #[error("{0} is already at the destination")]
    AlreadyThere(EntityId),

    #[error("{0} cannot be reached")]
    Unreachable(Position),

    // ===== combat =====
    #[error("{target} is out of range of {entity}")]
    OutOfRange { entity: EntityId, target: EntityId },

    #[error("{0} is not hostile")]
    FriendlyTarget(EntityId),

    #[error("{0} is hidden")]
    TargetHidden(EntityId),

    #[error("{0} is already down")]
    TargetDead(EntityId),

    #[error("{0} is still alive")]
    TargetAlive(EntityId),

    #[error("{0} cannot act while at zero health")]
    Incapacitated(EntityId),

    // ===== pipeline =====
    #[error("no handler registered for {0}")]
    Unregistered(ActionKind),

    #[error("{0} handler produced no outcome")]
    Unresolved(ActionKind),
}

impl GameError for Rejection {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unregistered(_) | Self::Unresolved(_) => ErrorSeverity::Internal,
            Self::NotYourTurn(_)
            | Self::NoActionsLeft(_)
            | Self::TurnInProgress
            | Self::NoTurnOpen
            | Self::Occupied { .. }
            | Self::Unreachable(_)
            | Self::OutOfRange { .. }
            | Self::TargetHidden(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingActor => "REJECT_MISSING_ACTOR",
            Self::UnknownActor(_) => "REJECT_UNKNOWN_ACTOR",
            Self::ActorDefeated(_) => "REJECT_ACTOR_DEFEATED",
            Self::NotYourTurn(_) => "REJECT_NOT_YOUR_TURN",
            Self::NotOwner { .. } => "REJECT_NOT_OWNER",
            Self::NoActionsLeft(_) => "REJECT_NO_ACTIONS_LEFT",
            Self::NotPermitted(_) => "REJECT_NOT_PERMITTED",
            Self::TurnInProgress => "REJECT_TURN_IN_PROGRESS",
            Self::NoTurnOpen => "REJECT_NO_TURN_OPEN",
            Self::NoActors => "REJECT_NO_ACTORS",
            Self::UnknownEntity(_) => "REJECT_UNKNOWN_ENTITY",
            Self::UnknownUnitType(_) => "REJECT_UNKNOWN_UNIT_TYPE",
            Self::OutOfBounds(_) => "REJECT_OUT_OF_BOUNDS",
            Self::Blocked(_) => "REJECT_BLOCKED",
            Self::Occupied { .. } => "REJECT_OCCUPIED",
            Self::AlreadyThere(_) => "REJECT_ALREADY_THERE",
            Self::Unreachable(_) => "REJECT_UNREACHABLE",
            Self::OutOfRange { .. } => "REJECT_OUT_OF_RANGE",
            Self::FriendlyTarget(_) => "REJECT_FRIENDLY_TARGET",
            Self::TargetHidden(_) => "REJECT_TARGET_HIDDEN",
            Self::TargetDead(_) => "REJECT_TARGET_DEAD",
            Self::TargetAlive(_) => "REJECT_TARGET_ALIVE",
            Self::Incapacitated(_) => "REJECT_INCAPACITATED",
            Self::Unregistered(_) => "REJECT_UNREGISTERED",
            Self::Unresolved(_) => "REJECT_UNRESOLVED",
        }
    }
}

/// A rejected intent paired with its reason, for surfacing to clients.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Denial {
    pub intent: ActionIntent,
    pub reason: Rejection,
}

impl Denial {
    pub fn new(intent: ActionIntent, reason: Rejection) -> Self {
        Self { intent, reason }
    }
}
