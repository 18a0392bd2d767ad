//! Traits describing read-only world data.
//!
//! Oracles expose static map geometry, unit type definitions and path search.
//! The [`GameEnv`] aggregate bundles them with the [`GameConfig`] so handlers
//! can access everything they need without hard coupling to concrete
//! implementations.
mod map;
mod path;
mod types;

pub use map::{MapDimensions, MapError, MapOracle, StaticMap, StaticTile, TerrainKind};
pub use path::{GridPathfinder, PathRequest, Pathfinder};
pub use types::{AttackRange, StaticTypeRegistry, TypeRegistry, UnitTraits, UnitType};

use crate::config::GameConfig;

/// Aggregates the read-only collaborators required by the action pipeline.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    map: &'a dyn MapOracle,
    types: &'a dyn TypeRegistry,
    paths: &'a dyn Pathfinder,
    config: &'a GameConfig,
}

impl<'a> GameEnv<'a> {
    pub fn new(
        map: &'a dyn MapOracle,
        types: &'a dyn TypeRegistry,
        paths: &'a dyn Pathfinder,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            map,
            types,
            paths,
            config,
        }
    }

    pub fn map(&self) -> &'a dyn MapOracle {
        self.map
    }

    pub fn types(&self) -> &'a dyn TypeRegistry {
        self.types
    }

    pub fn paths(&self) -> &'a dyn Pathfinder {
        self.paths
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }
}

impl core::fmt::Debug for GameEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameEnv")
            .field("dimensions", &self.map.dimensions())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
