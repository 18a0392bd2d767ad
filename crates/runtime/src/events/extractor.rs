//! Event extraction from committed plans.

use game_core::PlanData;

use super::types::TurnEvent;

/// Turn lifecycle events implied by `plans`, in execution order.
pub fn extract_turn_events<'a>(plans: impl IntoIterator<Item = &'a PlanData>) -> Vec<TurnEvent> {
    plans
        .into_iter()
        .filter_map(|data| match data {
            PlanData::StartTurn(start) => Some(TurnEvent::TurnStarted {
                actor: start.actor,
                turn: start.turn,
                round: start.round,
            }),
            PlanData::EndTurn(end) => Some(TurnEvent::TurnEnded { actor: end.actor }),
            PlanData::Surrender(surrender) => Some(TurnEvent::ActorDefeated {
                actor: surrender.actor,
            }),
            _ => None,
        })
        .collect()
}
