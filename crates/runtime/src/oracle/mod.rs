//! Runtime ownership of static game content.
//!
//! [`OracleBundle`] shares the immutable collaborators between the server and
//! every replaying client and builds [`GameEnv`] views on demand. Dynamic
//! state lives in the routers.
use std::fmt;
use std::sync::Arc;

use game_content::MatchContent;
use game_core::{GameConfig, GameEnv, GridPathfinder, MapOracle, Pathfinder, TypeRegistry};

#[derive(Clone)]
pub struct OracleBundle {
    map: Arc<dyn MapOracle>,
    types: Arc<dyn TypeRegistry>,
    paths: Arc<dyn Pathfinder>,
    config: Arc<GameConfig>,
}

impl OracleBundle {
    pub fn new(
        map: impl MapOracle + 'static,
        types: impl TypeRegistry + 'static,
        config: GameConfig,
    ) -> Self {
        Self {
            map: Arc::new(map),
            types: Arc::new(types),
            paths: Arc::new(GridPathfinder),
            config: Arc::new(config),
        }
    }

    pub fn from_content(content: &MatchContent) -> Self {
        Self {
            map: Arc::new(content.map.clone()),
            types: Arc::new(content.types.clone()),
            paths: Arc::new(content.paths),
            config: Arc::new(content.config.clone()),
        }
    }

    pub fn with_pathfinder(mut self, paths: impl Pathfinder + 'static) -> Self {
        self.paths = Arc::new(paths);
        self
    }

    pub fn env(&self) -> GameEnv<'_> {
        GameEnv::new(
            self.map.as_ref(),
            self.types.as_ref(),
            self.paths.as_ref(),
            &self.config,
        )
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

impl fmt::Debug for OracleBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleBundle")
            .field("dimensions", &self.map.dimensions())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
