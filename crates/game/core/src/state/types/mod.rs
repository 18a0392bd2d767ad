pub mod actor;
pub mod common;
pub mod entities;
pub mod turn;
pub mod world;

pub use actor::{ActorPhase, ActorState};
pub use common::{ActorId, EntityId, EventId, Position, TeamId, UnitTypeId};
pub use entities::{EntitiesState, UnitState};
pub use turn::TurnState;
pub use world::{TileMap, TileView, WorldState};
