//! Authoritative game state representation.
//!
//! This module owns the data structures that describe units, actors, turn
//! bookkeeping and tile occupancy. Routers clone or query this state but
//! mutate it exclusively through plan commits (`ActionHandler::on_end`).
//!
//! Every collection is ordered, so the bincode encoding produced by
//! [`GameState::canonical_bytes`] is identical on every process that applied
//! the same plans.
pub mod error;
pub mod types;

use std::collections::BTreeMap;

use crate::env::{MapOracle, TypeRegistry};
pub use error::InitializationError;
pub use types::{
    ActorId, ActorPhase, ActorState, EntitiesState, EntityId, EventId, Position, TeamId, TileMap,
    TileView, TurnState, UnitState, UnitTypeId, WorldState,
};

/// Canonical snapshot of the deterministic game state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Sequential entity id allocator (monotonically increasing, never reused).
    next_entity_id: u32,

    pub turn: TurnState,
    pub actors: BTreeMap<ActorId, ActorState>,
    pub entities: EntitiesState,
    pub world: WorldState,
}

impl GameState {
    /// Creates an empty board with no actors.
    pub fn empty() -> Self {
        Self {
            next_entity_id: 1,
            ..Self::default()
        }
    }

    pub fn unit(&self, id: EntityId) -> Option<&UnitState> {
        self.entities.unit(id)
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut UnitState> {
        self.entities.unit_mut(id)
    }

    pub fn unit_at(&self, position: Position) -> Option<&UnitState> {
        let id = self.world.tile_map.occupant(&position)?;
        self.entities.unit(id)
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorState> {
        self.actors.get_mut(&id)
    }

    /// Returns the owning actor of a unit.
    pub fn owner_of(&self, unit: EntityId) -> Option<&ActorState> {
        let owner = self.entities.unit(unit)?.owner;
        self.actors.get(&owner)
    }

    /// True when both units exist and belong to different teams.
    pub fn are_hostile(&self, a: EntityId, b: EntityId) -> bool {
        match (self.owner_of(a), self.owner_of(b)) {
            (Some(left), Some(right)) => left.is_hostile_to(right),
            _ => false,
        }
    }

    /// Returns a merged tile view that combines static map data with occupancy.
    pub fn tile_view<M>(&self, map: &M, position: Position) -> Option<TileView>
    where
        M: MapOracle + ?Sized,
    {
        self.world.tile_view(map, position)
    }

    /// The id the next spawned unit will receive.
    pub fn peek_entity_id(&self) -> EntityId {
        EntityId(self.next_entity_id.max(1))
    }

    /// Advances the allocator past `id`; used when committing a resolved spawn.
    pub fn reserve_entity_id(&mut self, id: EntityId) {
        self.next_entity_id = self.next_entity_id.max(id.0.saturating_add(1));
    }

    /// Seats an actor at the end of the turn order.
    pub fn add_actor(&mut self, actor: ActorState) -> Result<(), InitializationError> {
        if self.actors.contains_key(&actor.id) {
            return Err(InitializationError::DuplicateActor(actor.id));
        }
        self.turn.order.push(actor.id);
        self.actors.insert(actor.id, actor);
        Ok(())
    }

    /// Places a fresh unit of `unit_type` during match setup.
    pub fn place_unit<M, T>(
        &mut self,
        map: &M,
        types: &T,
        owner: ActorId,
        unit_type: UnitTypeId,
        position: Position,
    ) -> Result<EntityId, InitializationError>
    where
        M: MapOracle + ?Sized,
        T: TypeRegistry + ?Sized,
    {
        if !self.actors.contains_key(&owner) {
            return Err(InitializationError::UnknownActor(owner));
        }
        let definition = types
            .unit_type(unit_type)
            .ok_or(InitializationError::UnknownUnitType(unit_type))?;
        let view = self
            .tile_view(map, position)
            .ok_or(InitializationError::OutOfBounds { position })?;
        if !view.is_passable() {
            return Err(InitializationError::Impassable { position });
        }
        if let Some(occupant) = view.occupant() {
            return Err(InitializationError::PositionOccupied { position, occupant });
        }

        let id = self.peek_entity_id();
        if id.0 == u32::MAX {
            return Err(InitializationError::EntityIdOverflow);
        }

        let unit = UnitState::new(id, owner, unit_type, position, definition.max_health)
            .with_cloak(definition.has_cloak());
        self.insert_unit(map, unit)
    }

    /// Places a fully specified unit (explicit id) during match setup or scenario loading.
    pub fn insert_unit<M>(
        &mut self,
        map: &M,
        unit: UnitState,
    ) -> Result<EntityId, InitializationError>
    where
        M: MapOracle + ?Sized,
    {
        let position = unit.position;
        if !self.actors.contains_key(&unit.owner) {
            return Err(InitializationError::UnknownActor(unit.owner));
        }
        let view = self
            .tile_view(map, position)
            .ok_or(InitializationError::OutOfBounds { position })?;
        if let Some(occupant) = view.occupant() {
            return Err(InitializationError::PositionOccupied { position, occupant });
        }

        let id = unit.id;
        self.reserve_entity_id(id);
        self.world.tile_map.add_occupant(position, id);
        if let Some(actor) = self.actors.get_mut(&unit.owner) {
            actor.entities.insert(id);
        }
        self.entities.insert(unit);
        Ok(id)
    }
}

#[cfg(feature = "serde")]
impl GameState {
    /// Deterministic binary encoding used for convergence checks.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// SHA-256 digest of [`GameState::canonical_bytes`].
    pub fn state_root(&self) -> Result<[u8; 32], bincode::Error> {
        use sha2::{Digest, Sha256};
        Ok(Sha256::digest(self.canonical_bytes()?).into())
    }
}
