/// How a move onto a tile held by a hostile unit is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HostileMovePolicy {
    /// The move is rejected as occupied.
    Reject,
    /// Walk toward the hostile until it is in range, then chain an attack.
    #[default]
    AttackFromPath,
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Upper bound on plans the server flushes per tick.
    pub max_actions_per_tick: u32,

    /// Action budget given to actors that do not override it.
    pub default_max_actions_per_turn: u8,

    pub hostile_move: HostileMovePolicy,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Capacity of an actor's pending intent backlog.
    pub const MAX_INTENT_BACKLOG: usize = 8;
    /// Longest path (in steps) the pathfinder will search.
    pub const MAX_PATH_LEN: usize = 32;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ACTIONS_PER_TICK: u32 = 16;
    pub const DEFAULT_MAX_ACTIONS_PER_TURN: u8 = 2;

    pub fn new() -> Self {
        Self {
            max_actions_per_tick: Self::DEFAULT_MAX_ACTIONS_PER_TICK,
            default_max_actions_per_turn: Self::DEFAULT_MAX_ACTIONS_PER_TURN,
            hostile_move: HostileMovePolicy::default(),
        }
    }

    pub fn with_hostile_move(mut self, hostile_move: HostileMovePolicy) -> Self {
        self.hostile_move = hostile_move;
        self
    }

    pub fn with_max_actions_per_tick(mut self, max_actions_per_tick: u32) -> Self {
        self.max_actions_per_tick = max_actions_per_tick;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
