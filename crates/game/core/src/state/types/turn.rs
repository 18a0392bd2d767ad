use super::ActorId;

/// Turn bookkeeping owned by the turn manager.
///
/// Mutated only by StartTurn / EndTurn commits.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Fixed seating order of the match.
    pub order: Vec<ActorId>,

    /// Index into `order` of the actor whose turn was started last.
    pub cursor: Option<usize>,

    /// The actor currently holding the turn, if a turn is open.
    pub current_actor: Option<ActorId>,

    /// Number of turns started so far.
    pub turn: u32,

    /// Number of full cycles started so far (first turn of the match opens round 1).
    pub round: u32,

    /// Sequential identifier incremented by every committed plan.
    pub nonce: u64,
}

impl TurnState {
    pub fn new(order: Vec<ActorId>) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.current_actor.is_some()
    }
}
