//! Resolved, replayable units of mutation.
//!
//! An [`ExecutionPlan`] pairs the resolved [`PlanData`] of one action with the
//! follow-up intents it scheduled. Only the data crosses the network, wrapped
//! in a [`PlanRecord`]; the chain stays on the server.
use crate::state::{ActorId, EntityId, EventId, Position, UnitTypeId};

use super::{ActionIntent, ActionKind};

bitflags::bitflags! {
    /// Outcome markers resolved alongside the plan data.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PlanFlags: u8 {
        /// The attack is a retaliation and cannot itself be countered.
        const COUNTER = 1 << 0;
        /// The acting unit loses its cloak on commit.
        const UNCLOAK = 1 << 1;
        /// At least one resolution drops a unit to zero health.
        const LETHAL = 1 << 2;
        /// Commit spends one action from the owner's turn budget.
        const CONSUMES_ACTION = 1 << 3;
        /// A move that stopped short of a hostile and chained an attack.
        const ATTACK_MOVE = 1 << 4;
    }
}

// Raw bitmask on the wire.
#[cfg(feature = "serde")]
impl serde::Serialize for PlanFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PlanFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = <u8 as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}

/// Lifecycle of a plan inside the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Pending,
    Active,
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartTurnData {
    pub actor: ActorId,
    /// Seat index in the turn order.
    pub index: u32,
    pub turn: u32,
    pub round: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnData {
    pub actor: ActorId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveData {
    pub entity: EntityId,
    pub actor: ActorId,
    /// Walked tiles, origin first. A single entry is a zero-distance move.
    pub path: Vec<Position>,
    pub flags: PlanFlags,
    /// World event fired by the destination tile.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub trigger: Option<EventId>,
}

impl MoveData {
    pub fn origin(&self) -> Option<Position> {
        self.path.first().copied()
    }

    pub fn destination(&self) -> Option<Position> {
        self.path.last().copied()
    }
}

/// Health of one unit after an attack resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub entity: EntityId,
    pub health: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackData {
    pub entity: EntityId,
    pub target: EntityId,
    pub actor: ActorId,
    pub resolutions: Vec<Resolution>,
    pub flags: PlanFlags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathData {
    pub entity: EntityId,
    pub owner: ActorId,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnData {
    pub entity: EntityId,
    pub owner: ActorId,
    pub unit_type: UnitTypeId,
    pub position: Position,
    pub health: u32,
    pub cloaked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurrenderData {
    pub actor: ActorId,
    /// Whether the actor held the turn when it surrendered.
    pub held_turn: bool,
    pub units: Vec<EntityId>,
}

/// Immutable resolved outcome of one action. This is exactly what is
/// serialized and replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "data", rename_all = "snake_case")
)]
pub enum PlanData {
    StartTurn(StartTurnData),
    EndTurn(EndTurnData),
    Move(MoveData),
    Attack(AttackData),
    Death(DeathData),
    Spawn(SpawnData),
    Surrender(SurrenderData),
}

impl PlanData {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::StartTurn(_) => ActionKind::StartTurn,
            Self::EndTurn(_) => ActionKind::EndTurn,
            Self::Move(_) => ActionKind::Move,
            Self::Attack(_) => ActionKind::Attack,
            Self::Death(_) => ActionKind::Death,
            Self::Spawn(_) => ActionKind::Spawn,
            Self::Surrender(_) => ActionKind::Surrender,
        }
    }

    pub fn flags(&self) -> PlanFlags {
        match self {
            Self::Move(data) => data.flags,
            Self::Attack(data) => data.flags,
            _ => PlanFlags::empty(),
        }
    }
}

/// Wire form of a completed plan: `{ "type": ..., "data": ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlanRecord(PlanData);

impl PlanRecord {
    pub fn new(data: PlanData) -> Self {
        Self(data)
    }

    pub fn kind(&self) -> ActionKind {
        self.0.kind()
    }

    pub fn data(&self) -> &PlanData {
        &self.0
    }

    pub fn into_data(self) -> PlanData {
        self.0
    }
}

/// A plan moving through the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionPlan {
    kind: ActionKind,
    data: Option<PlanData>,
    chain: Vec<ActionIntent>,
    run_state: RunState,
}

impl ExecutionPlan {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            data: None,
            chain: Vec::new(),
            run_state: RunState::Pending,
        }
    }

    /// Rebuilds a resolved plan from a server-confirmed record. Replayed plans
    /// never carry a chain.
    pub fn from_record(record: PlanRecord) -> Self {
        let data = record.into_data();
        Self {
            kind: data.kind(),
            data: Some(data),
            chain: Vec::new(),
            run_state: RunState::Pending,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Sets the resolved outcome. Data is write-once; a second call is ignored.
    pub fn resolve(&mut self, data: PlanData) {
        debug_assert_eq!(data.kind(), self.kind, "plan resolved with foreign data");
        debug_assert!(self.data.is_none(), "plan data is write-once");
        if self.data.is_none() && data.kind() == self.kind {
            self.data = Some(data);
        }
    }

    /// Schedules a follow-up intent, re-validated after this plan commits.
    pub fn add_next(&mut self, intent: ActionIntent) {
        self.chain.push(intent);
    }

    pub fn data(&self) -> Option<&PlanData> {
        self.data.as_ref()
    }

    pub fn chain(&self) -> &[ActionIntent] {
        &self.chain
    }

    pub fn is_resolved(&self) -> bool {
        self.data.is_some()
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub(crate) fn set_run_state(&mut self, run_state: RunState) {
        self.run_state = run_state;
    }

    pub(crate) fn take_chain(&mut self) -> Vec<ActionIntent> {
        std::mem::take(&mut self.chain)
    }

    pub fn to_record(&self) -> Option<PlanRecord> {
        self.data.clone().map(PlanRecord::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_data() -> PlanData {
        PlanData::Move(MoveData {
            entity: EntityId(5),
            actor: ActorId(1),
            path: vec![Position::new(3, 3), Position::new(3, 4)],
            flags: PlanFlags::CONSUMES_ACTION,
            trigger: None,
        })
    }

    #[test]
    fn data_is_write_once() {
        let mut plan = ExecutionPlan::new(ActionKind::Move);
        assert!(!plan.is_resolved());
        assert!(plan.to_record().is_none());

        plan.resolve(move_data());
        assert!(plan.is_resolved());
        assert_eq!(plan.to_record().unwrap().kind(), ActionKind::Move);
    }

    #[test]
    fn replayed_plans_have_no_chain() {
        let mut plan = ExecutionPlan::new(ActionKind::Move);
        plan.resolve(move_data());
        plan.add_next(ActionIntent::chained(crate::action::IntentPayload::Death {
            entity: EntityId(9),
        }));
        assert_eq!(plan.chain().len(), 1);

        let replayed = ExecutionPlan::from_record(plan.to_record().unwrap());
        assert!(replayed.chain().is_empty());
        assert_eq!(replayed.data(), plan.data());
        assert_eq!(replayed.run_state(), RunState::Pending);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn record_wire_shape() {
        let record = PlanRecord::new(move_data());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "move");
        assert_eq!(json["data"]["entity"], 5);
        assert_eq!(json["data"]["flags"], PlanFlags::CONSUMES_ACTION.bits());
        assert_eq!(json["data"]["path"][1]["y"], 4);
        assert!(json["data"].get("trigger").is_none());

        let decoded: PlanRecord = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, record);
    }
}
