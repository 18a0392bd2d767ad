use std::collections::BTreeMap;

use super::{ActorId, EntityId, Position, UnitTypeId};

/// A single unit on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: EntityId,
    pub owner: ActorId,
    pub unit_type: UnitTypeId,
    pub position: Position,
    pub health: u32,
    /// Hidden from hostile view until it attacks or ends a move next to a hostile.
    pub cloaked: bool,
}

impl UnitState {
    pub fn new(
        id: EntityId,
        owner: ActorId,
        unit_type: UnitTypeId,
        position: Position,
        health: u32,
    ) -> Self {
        Self {
            id,
            owner,
            unit_type,
            position,
            health,
            cloaked: false,
        }
    }

    pub fn with_cloak(mut self, cloaked: bool) -> Self {
        self.cloaked = cloaked;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Every unit on the board, keyed by id.
///
/// Ordered so iteration (and therefore serialization) is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitiesState {
    units: BTreeMap<EntityId, UnitState>,
}

impl EntitiesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self, id: EntityId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut UnitState> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.units.contains_key(&id)
    }

    /// Inserts a unit, returning the previous unit stored under the same id.
    pub fn insert(&mut self, unit: UnitState) -> Option<UnitState> {
        self.units.insert(unit.id, unit)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<UnitState> {
        self.units.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.units.values()
    }

    pub fn owned_by(&self, owner: ActorId) -> impl Iterator<Item = &UnitState> {
        self.units.values().filter(move |unit| unit.owner == owner)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
