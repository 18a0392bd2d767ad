//! Built-in handlers, one per [`ActionKind`](super::ActionKind).
mod attack;
mod death;
mod end_turn;
mod movement;
mod spawn;
mod start_turn;
mod surrender;

pub use attack::AttackHandler;
pub use death::DeathHandler;
pub use end_turn::EndTurnHandler;
pub use movement::MoveHandler;
pub use spawn::SpawnHandler;
pub use start_turn::StartTurnHandler;
pub use surrender::SurrenderHandler;

use crate::state::{ActorId, GameState, UnitState};

use super::{ActionIntent, PlanData, Rejection};

/// Checks that an actor-originated intent may act with `unit` right now.
///
/// Non-actor intents pass; they are gated by the handler that produced them.
/// Returns the unit's owner.
pub(crate) fn authorize(
    state: &GameState,
    intent: &ActionIntent,
    unit: &UnitState,
) -> Result<ActorId, Rejection> {
    if !intent.is_from_actor() {
        return Ok(unit.owner);
    }

    let actor_id = intent.actor.ok_or(Rejection::MissingActor)?;
    let actor = state
        .actor(actor_id)
        .ok_or(Rejection::UnknownActor(actor_id))?;
    if actor.defeated {
        return Err(Rejection::ActorDefeated(actor_id));
    }
    if unit.owner != actor_id {
        return Err(Rejection::NotOwner {
            actor: actor_id,
            entity: unit.id,
        });
    }
    if state.turn.current_actor != Some(actor_id) {
        return Err(Rejection::NotYourTurn(actor_id));
    }
    if !actor.has_budget() {
        return Err(Rejection::NoActionsLeft(actor_id));
    }
    Ok(actor_id)
}

/// Logs a commit that received another kind's data. Unreachable through the
/// queue, which looks handlers up by the plan's own kind.
pub(crate) fn foreign_data(expected: super::ActionKind, data: &PlanData) {
    tracing::error!(
        target: "action::commit",
        %expected,
        found = %data.kind(),
        "commit skipped: mismatched plan data"
    );
}
