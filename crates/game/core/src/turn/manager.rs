use crate::action::Rejection;
use crate::state::{ActorId, GameState};

/// The seat that a StartTurn would open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextTurn {
    pub actor: ActorId,
    /// Position of `actor` in the turn order.
    pub index: usize,
    /// True when the cursor wrapped back to the start of the order, which
    /// begins a new round.
    pub wrapped: bool,
}

/// Read-side queries over [`TurnState`](crate::state::TurnState).
///
/// All mutation happens in the StartTurn / EndTurn commits.
#[derive(Clone, Copy, Debug, Default)]
pub struct TurnManager;

impl TurnManager {
    pub fn current_actor(state: &GameState) -> Option<ActorId> {
        state.turn.current_actor
    }

    pub fn is_turn_of(state: &GameState, actor: ActorId) -> bool {
        state.turn.current_actor == Some(actor)
    }

    /// Next non-defeated actor after the cursor, in seating order.
    pub fn next_turn(state: &GameState) -> Result<NextTurn, Rejection> {
        let order = &state.turn.order;
        if order.is_empty() {
            return Err(Rejection::NoActors);
        }

        let start = state.turn.cursor.map_or(0, |cursor| cursor + 1);
        (0..order.len())
            .map(|offset| (start + offset) % order.len())
            .find_map(|index| {
                let actor = state.actor(order[index])?;
                if actor.defeated {
                    return None;
                }
                let wrapped = state.turn.cursor.is_none_or(|cursor| index <= cursor);
                Some(NextTurn {
                    actor: actor.id,
                    index,
                    wrapped,
                })
            })
            .ok_or(Rejection::NoActors)
    }
}
