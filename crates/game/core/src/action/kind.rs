/// Closed set of action types understood by the pipeline.
///
/// Each kind has exactly one handler registered in the
/// [`ActionRegistry`](super::ActionRegistry).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    StartTurn,
    EndTurn,
    Move,
    Attack,
    Death,
    Spawn,
    Surrender,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Kinds that spend the acting unit owner's per-turn budget when requested by a player.
    pub fn is_unit_action(self) -> bool {
        matches!(self, Self::Move | Self::Attack)
    }
}
