use std::collections::BTreeSet;

use super::{ActorId, EntityId, TeamId};

/// Whether an actor currently holds the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorPhase {
    #[default]
    Idle,
    Acting,
}

/// Replicated per-actor bookkeeping.
///
/// The intent backlog is deliberately not part of this struct: it is local to
/// the authoritative server (see [`crate::turn::Actor`]) and never replicated.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: ActorId,
    pub team: TeamId,
    pub max_actions_per_turn: u8,
    pub actions_taken: u8,
    pub entities: BTreeSet<EntityId>,
    pub phase: ActorPhase,
    pub defeated: bool,
}

impl ActorState {
    pub fn new(id: ActorId, team: TeamId, max_actions_per_turn: u8) -> Self {
        Self {
            id,
            team,
            max_actions_per_turn,
            actions_taken: 0,
            entities: BTreeSet::new(),
            phase: ActorPhase::Idle,
            defeated: false,
        }
    }

    /// Opens this actor's turn: IDLE → ACTING with a fresh action budget.
    pub fn start_turn(&mut self) {
        self.phase = ActorPhase::Acting;
        self.actions_taken = 0;
    }

    /// Closes this actor's turn: ACTING → IDLE.
    pub fn end_turn(&mut self) {
        self.phase = ActorPhase::Idle;
    }

    pub fn has_budget(&self) -> bool {
        self.actions_taken < self.max_actions_per_turn
    }

    /// Records one spent action, saturating at the per-turn maximum.
    ///
    /// Replays apply confirmed records without gating, so an exhausted
    /// budget is not an error here.
    pub fn spend_action(&mut self) {
        self.actions_taken = self
            .actions_taken
            .saturating_add(1)
            .min(self.max_actions_per_turn);
    }

    pub fn is_hostile_to(&self, other: &ActorState) -> bool {
        self.team != other.team
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spending_saturates_at_the_budget() {
        let mut actor = ActorState::new(ActorId(1), TeamId(1), 2);
        actor.start_turn();
        for _ in 0..300 {
            actor.spend_action();
        }
        assert_eq!(actor.actions_taken, 2);
        assert!(!actor.has_budget());

        actor.start_turn();
        assert!(actor.has_budget());
    }

    #[test]
    fn full_u8_budget_does_not_overflow() {
        let mut actor = ActorState::new(ActorId(1), TeamId(1), u8::MAX);
        actor.actions_taken = u8::MAX;
        actor.spend_action();
        assert_eq!(actor.actions_taken, u8::MAX);
    }
}
