//! Deterministic action pipeline shared by servers and replaying clients.
//!
//! `game-core` defines the canonical rules (intents, handlers, plans, turn
//! control, world state) and exposes pure, synchronous APIs. All state
//! mutation flows through [`ActionQueue`] commits, and the runtime crates
//! depend on the types re-exported here.
pub mod action;
pub mod config;
pub mod env;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;
pub mod state;
pub mod turn;

pub use action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, ActionQueue, ActionRegistry,
    AnimationTimer, Cue, Denial, ExecutionPlan, IntentOrigin, IntentPayload, NullPresenter,
    PlanData, PlanFlags, PlanRecord, Presenter, Rejection, RuleContext, RunState, ViewContext,
};
pub use config::{GameConfig, HostileMovePolicy};
pub use env::{
    AttackRange, GameEnv, GridPathfinder, MapDimensions, MapError, MapOracle, PathRequest,
    Pathfinder, StaticMap, StaticTile, StaticTypeRegistry, TerrainKind, TypeRegistry, UnitTraits,
    UnitType,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    ActorId, ActorPhase, ActorState, EntitiesState, EntityId, EventId, GameState,
    InitializationError, Position, TeamId, TileMap, TileView, TurnState, UnitState, UnitTypeId,
    WorldState,
};
pub use turn::{Actor, BacklogFull, IntentBacklog, NextTurn, TryEnqueue, TurnManager};
