//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use game_core::{GameConfig, GameState, GridPathfinder, StaticMap, StaticTypeRegistry};

use crate::loaders::{ConfigLoader, LoadResult, MapLoader, ScenarioLoader, ScenarioSpec, UnitLoader};

/// Everything a match needs besides the runtime: oracles, configuration,
/// the scenario and the opening state it builds.
#[derive(Debug, Clone)]
pub struct MatchContent {
    pub map: StaticMap,
    pub types: StaticTypeRegistry,
    pub paths: GridPathfinder,
    pub config: GameConfig,
    pub scenario: ScenarioSpec,
    pub state: GameState,
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── units.ron
/// ├── maps/
/// │   └── skirmish.ron
/// └── scenarios/
///     └── skirmish.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or the default
    /// configuration if the file does not exist.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the unit type catalog from `units.ron`.
    pub fn load_units(&self) -> LoadResult<StaticTypeRegistry> {
        UnitLoader::load(&self.data_dir.join("units.ron"))
    }

    /// Load a map from `maps/{map_name}.ron`.
    pub fn load_map(&self, map_name: &str) -> LoadResult<StaticMap> {
        let path = self.data_dir.join("maps").join(format!("{}.ron", map_name));
        MapLoader::load(&path)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioSpec> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Loads a scenario with the map, catalog and configuration it uses and
    /// builds its opening state.
    pub fn load_match(&self, scenario_name: &str) -> LoadResult<MatchContent> {
        let scenario = self.load_scenario(scenario_name)?;
        let map = self.load_map(&scenario.map)?;
        let types = self.load_units()?;
        let config = self.load_config()?;
        let state = scenario.build_state(&map, &types, &config).map_err(|e| {
            anyhow::anyhow!("Scenario '{}' cannot be set up: {}", scenario_name, e)
        })?;

        Ok(MatchContent {
            map,
            types,
            paths: GridPathfinder,
            config,
            scenario,
            state,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use game_core::{ActorId, HostileMovePolicy, TypeRegistry, UnitTraits, UnitTypeId};

    use super::*;

    fn write_content(dir: &Path) {
        fs::create_dir_all(dir.join("maps")).unwrap();
        fs::create_dir_all(dir.join("scenarios")).unwrap();
        fs::write(
            dir.join("units.ron"),
            r#"[(id: 1, name: "Infantry", max_health: 10, attack: 5, defense: 2, move_range: 3)]"#,
        )
        .unwrap();
        fs::write(dir.join("maps/duel.ron"), r#"(rows: ["....", "...."])"#).unwrap();
        fs::write(
            dir.join("scenarios/duel.ron"),
            r#"(
                map: "duel",
                actors: [(id: 1, team: 1), (id: 2, team: 2)],
                units: [
                    (owner: 1, unit_type: 1, position: (x: 0, y: 0)),
                    (owner: 2, unit_type: 1, position: (x: 3, y: 1)),
                ],
            )"#,
        )
        .unwrap();
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_a_complete_match() {
        let dir = tempfile::tempdir().unwrap();
        write_content(dir.path());

        let content = ContentFactory::new(dir.path()).load_match("duel").unwrap();
        assert!(content.types.unit_type(UnitTypeId(1)).is_some());
        assert_eq!(content.config, GameConfig::default());
        assert_eq!(content.state.entities.len(), 2);
        assert_eq!(content.state.actor(ActorId(2)).unwrap().entities.len(), 1);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_content(dir.path());
        fs::write(dir.path().join("config.toml"), "hostile_move = \"reject\"\n").unwrap();

        let config = ContentFactory::new(dir.path()).load_config().unwrap();
        assert_eq!(config.hostile_move, HostileMovePolicy::Reject);
    }

    #[test]
    fn shipped_skirmish_loads() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../server/data");
        let content = ContentFactory::new(data).load_match("skirmish").unwrap();

        let scout = content.types.unit_type(UnitTypeId(2)).unwrap();
        assert_eq!(scout.traits, UnitTraits::CLOAK);
        let archer = content.types.unit_type(UnitTypeId(3)).unwrap();
        assert!(!archer.can_counter());

        assert_eq!(content.scenario.actors.len(), 2);
        assert_eq!(content.scenario.schedule.len(), 3);
        assert_eq!(content.state.entities.len(), 4);
        assert_eq!(content.config.hostile_move, HostileMovePolicy::AttackFromPath);
    }

    #[test]
    fn missing_map_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_content(dir.path());
        fs::remove_file(dir.path().join("maps/duel.ron")).unwrap();

        assert!(ContentFactory::new(dir.path()).load_match("duel").is_err());
    }
}
