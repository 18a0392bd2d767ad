use std::collections::BTreeMap;

use crate::env::{MapOracle, StaticTile};

use super::{EntityId, Position};

/// Aggregated world-level state layered on top of the static map.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    pub tile_map: TileMap,
}

impl WorldState {
    pub fn new(tile_map: TileMap) -> Self {
        Self { tile_map }
    }

    /// Produces a merged view combining static tile data with the occupant.
    pub fn tile_view<M>(&self, map: &M, position: Position) -> Option<TileView>
    where
        M: MapOracle + ?Sized,
    {
        let static_tile = map.tile(position)?;
        Some(TileView {
            position,
            static_tile,
            occupant: self.tile_map.occupant(&position),
        })
    }
}

/// Occupancy index: at most one unit per tile.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileMap {
    occupancy: BTreeMap<Position, EntityId>,
}

impl TileMap {
    pub fn occupancy(&self) -> &BTreeMap<Position, EntityId> {
        &self.occupancy
    }

    pub fn occupant(&self, position: &Position) -> Option<EntityId> {
        self.occupancy.get(position).copied()
    }

    /// Places `entity` on `position`. Fails if another unit already stands there.
    pub fn add_occupant(&mut self, position: Position, entity: EntityId) -> bool {
        match self.occupancy.get(&position) {
            Some(existing) => *existing == entity,
            None => {
                self.occupancy.insert(position, entity);
                true
            }
        }
    }

    /// Clears `position` if `entity` is the one standing there.
    pub fn remove_occupant(&mut self, position: &Position, entity: EntityId) -> bool {
        if self.occupancy.get(position) == Some(&entity) {
            self.occupancy.remove(position);
            true
        } else {
            false
        }
    }
}

/// Aggregated tile information used by handlers during validation.
pub struct TileView {
    position: Position,
    static_tile: StaticTile,
    occupant: Option<EntityId>,
}

impl TileView {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn static_tile(&self) -> &StaticTile {
        &self.static_tile
    }

    pub fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    pub fn is_passable(&self) -> bool {
        self.static_tile.is_passable()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}
