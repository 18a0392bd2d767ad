//! Errors raised while assembling an initial game state.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActorId, EntityId, Position, UnitTypeId};

/// Setup-time failures. Once a match is running, state only changes through
/// plan commits and these cannot occur.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitializationError {
    #[error("actor {0} is already seated")]
    DuplicateActor(ActorId),

    #[error("actor {0} is not seated")]
    UnknownActor(ActorId),

    #[error("unit type {0:?} is not registered")]
    UnknownUnitType(UnitTypeId),

    #[error("position {position} is outside the map")]
    OutOfBounds { position: Position },

    #[error("position {position} is not passable")]
    Impassable { position: Position },

    #[error("position {position} is already occupied by {occupant}")]
    PositionOccupied {
        position: Position,
        occupant: EntityId,
    },

    #[error("entity id space exhausted")]
    EntityIdOverflow,
}

impl GameError for InitializationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EntityIdOverflow => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateActor(_) => "INIT_DUPLICATE_ACTOR",
            Self::UnknownActor(_) => "INIT_UNKNOWN_ACTOR",
            Self::UnknownUnitType(_) => "INIT_UNKNOWN_UNIT_TYPE",
            Self::OutOfBounds { .. } => "INIT_OUT_OF_BOUNDS",
            Self::Impassable { .. } => "INIT_IMPASSABLE",
            Self::PositionOccupied { .. } => "INIT_POSITION_OCCUPIED",
            Self::EntityIdOverflow => "INIT_ENTITY_ID_OVERFLOW",
        }
    }
}
