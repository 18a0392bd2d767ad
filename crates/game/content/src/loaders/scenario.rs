//! Scenario loader.
//!
//! A scenario seats the actors, places starting units and lists system
//! intents to inject when a round begins or a map trigger fires.

use std::path::Path;

use game_core::{
    ActionIntent, ActorId, ActorState, EventId, GameConfig, GameState, InitializationError,
    IntentPayload, MapOracle, Position, TeamId, TypeRegistry, UnitTypeId,
};
use ron::extensions::Extensions;
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// One seat in the turn order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeatSpec {
    pub id: ActorId,
    pub team: TeamId,
    /// Overrides `GameConfig::default_max_actions_per_turn`.
    #[serde(default)]
    pub max_actions: Option<u8>,
}

/// A unit placed before the first turn.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitSpec {
    pub owner: ActorId,
    pub unit_type: UnitTypeId,
    pub position: Position,
}

/// When a scheduled intent is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum ScheduleTrigger {
    /// At the start of the given round.
    Round(u32),
    /// Whenever a commit fires the given world event.
    Event(EventId),
}

/// System intents a scenario may schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum ScheduledAction {
    Spawn {
        owner: ActorId,
        unit_type: UnitTypeId,
        position: Position,
    },
    Surrender {
        actor: ActorId,
    },
}

impl ScheduledAction {
    pub fn to_intent(&self) -> ActionIntent {
        match *self {
            Self::Spawn {
                owner,
                unit_type,
                position,
            } => ActionIntent::spawn(owner, unit_type, position),
            Self::Surrender { actor } => ActionIntent::system(IntentPayload::Surrender { actor }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
    pub trigger: ScheduleTrigger,
    pub action: ScheduledAction,
}

/// Scenario file contents.
///
/// ```ron
/// (
///     map: "skirmish",
///     actors: [(id: 1, team: 1), (id: 2, team: 2, max_actions: 3)],
///     units: [(owner: 1, unit_type: 1, position: (x: 1, y: 1))],
///     schedule: [
///         (trigger: Round(2), action: Spawn(owner: 2, unit_type: 1, position: (x: 6, y: 6))),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioSpec {
    /// Map name, resolved under `maps/`.
    pub map: String,
    pub actors: Vec<SeatSpec>,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

impl ScenarioSpec {
    /// Builds the opening state: seats in file order, then units with
    /// sequential entity ids. No turn is open yet.
    pub fn build_state(
        &self,
        map: &dyn MapOracle,
        types: &dyn TypeRegistry,
        config: &GameConfig,
    ) -> Result<GameState, InitializationError> {
        let mut state = GameState::empty();
        for seat in &self.actors {
            let budget = seat
                .max_actions
                .unwrap_or(config.default_max_actions_per_turn);
            state.add_actor(ActorState::new(seat.id, seat.team, budget))?;
        }
        for unit in &self.units {
            state.place_unit(map, types, unit.owner, unit.unit_type, unit.position)?;
        }
        Ok(state)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        // `max_actions: 3` without `Some(..)`.
        let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
        let spec: ScenarioSpec = options
            .from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        if spec.actors.is_empty() {
            anyhow::bail!("Scenario seats no actors");
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use game_core::{ActionKind, EntityId, IntentOrigin, StaticMap, StaticTypeRegistry, UnitType};

    use super::*;

    const SCENARIO: &str = r#"(
        map: "duel",
        actors: [(id: 1, team: 1), (id: 2, team: 2, max_actions: 3)],
        units: [
            (owner: 1, unit_type: 1, position: (x: 0, y: 0)),
            (owner: 2, unit_type: 1, position: (x: 2, y: 1)),
        ],
        schedule: [
            (trigger: Round(2), action: Spawn(owner: 2, unit_type: 1, position: (x: 1, y: 1))),
            (trigger: Event(7), action: Surrender(actor: 1)),
        ],
    )"#;

    fn types() -> StaticTypeRegistry {
        [UnitType {
            id: UnitTypeId(1),
            name: "Infantry".into(),
            max_health: 10,
            attack: 5,
            defense: 2,
            move_range: 3,
            attack_range: Default::default(),
            traits: Default::default(),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn loads_scenario_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let spec = ScenarioLoader::load(file.path()).unwrap();
        assert_eq!(spec.map, "duel");
        assert_eq!(spec.actors.len(), 2);
        assert_eq!(spec.actors[1].max_actions, Some(3));
        assert_eq!(spec.schedule[0].trigger, ScheduleTrigger::Round(2));
        assert_eq!(spec.schedule[1].trigger, ScheduleTrigger::Event(EventId(7)));
    }

    #[test]
    fn builds_the_opening_state() {
        let spec = ScenarioLoader::parse(SCENARIO).unwrap();
        let map = StaticMap::from_rows(&["...", "..."]).unwrap();
        let config = GameConfig::default();

        let state = spec.build_state(&map, &types(), &config).unwrap();
        assert_eq!(state.turn.order, vec![ActorId(1), ActorId(2)]);
        assert!(state.turn.current_actor.is_none());
        assert_eq!(
            state.actor(ActorId(1)).unwrap().max_actions_per_turn,
            config.default_max_actions_per_turn
        );
        assert_eq!(state.actor(ActorId(2)).unwrap().max_actions_per_turn, 3);
        assert_eq!(
            state.unit_at(Position::new(2, 1)).map(|unit| unit.id),
            Some(EntityId(2))
        );
    }

    #[test]
    fn placement_errors_surface() {
        let mut spec = ScenarioLoader::parse(SCENARIO).unwrap();
        spec.units.push(UnitSpec {
            owner: ActorId(2),
            unit_type: UnitTypeId(1),
            position: Position::new(0, 0),
        });
        let map = StaticMap::from_rows(&["...", "..."]).unwrap();
        let err = spec
            .build_state(&map, &types(), &GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, InitializationError::PositionOccupied { .. }));
    }

    #[test]
    fn scheduled_actions_become_system_intents() {
        let spec = ScenarioLoader::parse(SCENARIO).unwrap();
        let spawn = spec.schedule[0].action.to_intent();
        assert_eq!(spawn.kind(), ActionKind::Spawn);
        assert_eq!(spawn.origin, IntentOrigin::System);

        let surrender = spec.schedule[1].action.to_intent();
        assert_eq!(
            surrender.payload,
            IntentPayload::Surrender { actor: ActorId(1) }
        );
        assert_eq!(surrender.origin, IntentOrigin::System);
    }

    #[test]
    fn a_scenario_needs_actors() {
        assert!(ScenarioLoader::parse(r#"(map: "duel", actors: [])"#).is_err());
    }
}
