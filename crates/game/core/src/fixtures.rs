//! Small skirmish used by tests across the workspace.
//!
//! An 8x8 board with a wall at (4, 4), water at (7, 0) and a trigger tile at
//! (6, 1); two seats on opposing teams; three unit types.
use std::collections::BTreeMap;

use crate::action::{
    ActionContext, ActionIntent, ActionQueue, NullPresenter, PlanRecord, Rejection, RuleContext,
};
use crate::config::GameConfig;
use crate::env::{
    AttackRange, GameEnv, GridPathfinder, StaticMap, StaticTypeRegistry, TypeRegistry,
    UnitTraits, UnitType,
};
use crate::state::{
    ActorId, ActorState, EntityId, EventId, GameState, Position, TeamId, UnitState, UnitTypeId,
};

pub const RED: ActorId = ActorId(1);
pub const BLUE: ActorId = ActorId(2);

pub const INFANTRY: UnitTypeId = UnitTypeId(1);
pub const SCOUT: UnitTypeId = UnitTypeId(2);
pub const ARCHER: UnitTypeId = UnitTypeId(3);

pub const WALL: Position = Position { x: 4, y: 4 };
pub const TRIGGER_TILE: Position = Position { x: 6, y: 1 };
pub const TRIGGER_EVENT: EventId = EventId(100);

const ROWS: [&str; 8] = [
    ".......~",
    "........",
    "........",
    "........",
    "....#...",
    "........",
    "........",
    "........",
];

/// Owned collaborators for one board.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub map: StaticMap,
    pub types: StaticTypeRegistry,
    pub paths: GridPathfinder,
    pub config: GameConfig,
}

impl Fixture {
    pub fn skirmish() -> Self {
        let mut triggers = BTreeMap::new();
        triggers.insert(TRIGGER_TILE, TRIGGER_EVENT);
        let map = StaticMap::from_rows(&ROWS)
            .and_then(|map| map.with_triggers(&triggers))
            .expect("fixture map is well formed");

        Self {
            map,
            types: unit_catalog(),
            paths: GridPathfinder,
            config: GameConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn env(&self) -> GameEnv<'_> {
        GameEnv::new(&self.map, &self.types, &self.paths, &self.config)
    }

    pub fn rules<'a>(&'a self, state: &'a GameState) -> RuleContext<'a> {
        RuleContext::new(state, self.env())
    }

    /// Both seats, no units, no turn open.
    pub fn state(&self) -> GameState {
        let mut state = GameState::empty();
        let budget = self.config.default_max_actions_per_turn;
        state
            .add_actor(ActorState::new(RED, TeamId(1), budget))
            .expect("fresh state");
        state
            .add_actor(ActorState::new(BLUE, TeamId(2), budget))
            .expect("fresh state");
        state
    }
}

pub fn unit_catalog() -> StaticTypeRegistry {
    [
        UnitType {
            id: INFANTRY,
            name: "Infantry".into(),
            max_health: 10,
            attack: 5,
            defense: 2,
            move_range: 3,
            attack_range: AttackRange::MELEE,
            traits: UnitTraits::empty(),
        },
        UnitType {
            id: SCOUT,
            name: "Scout".into(),
            max_health: 6,
            attack: 3,
            defense: 1,
            move_range: 5,
            attack_range: AttackRange::MELEE,
            traits: UnitTraits::CLOAK,
        },
        UnitType {
            id: ARCHER,
            name: "Archer".into(),
            max_health: 7,
            attack: 4,
            defense: 1,
            move_range: 2,
            attack_range: AttackRange::new(2, 3),
            traits: UnitTraits::empty(),
        },
    ]
    .into_iter()
    .collect()
}

/// Places a full-health unit with an explicit id.
pub fn place(
    state: &mut GameState,
    fixture: &Fixture,
    id: u32,
    owner: ActorId,
    unit_type: UnitTypeId,
    (x, y): (i32, i32),
) -> EntityId {
    let definition = fixture
        .types
        .unit_type(unit_type)
        .expect("fixture unit type");
    let unit = UnitState::new(
        EntityId(id),
        owner,
        unit_type,
        Position::new(x, y),
        definition.max_health,
    )
    .with_cloak(definition.has_cloak());
    state
        .insert_unit(&fixture.map, unit)
        .expect("fixture placement")
}

/// Opens `actor`'s turn directly, as a committed StartTurn would.
pub fn open_turn(state: &mut GameState, actor: ActorId) {
    let index = state.turn.order.iter().position(|&seat| seat == actor);
    state.turn.cursor = index;
    state.turn.current_actor = Some(actor);
    state.turn.turn += 1;
    state.turn.round = state.turn.round.max(1);
    if let Some(seat) = state.actor_mut(actor) {
        seat.start_turn();
    }
}

/// Resolves `intent`, then flushes the queue (chains included) headlessly.
pub fn run(
    queue: &mut ActionQueue,
    state: &mut GameState,
    fixture: &Fixture,
    intent: ActionIntent,
) -> Result<Vec<PlanRecord>, Rejection> {
    run_with_events(queue, state, fixture, intent).map(|(records, _)| records)
}

/// Like [`run`], also returning the world events fired by the commits.
pub fn run_with_events(
    queue: &mut ActionQueue,
    state: &mut GameState,
    fixture: &Fixture,
    intent: ActionIntent,
) -> Result<(Vec<PlanRecord>, Vec<EventId>), Rejection> {
    let plan = queue.try_create_execution_plan(&fixture.rules(state), &intent)?;
    queue.enqueue(plan);

    let mut presenter = NullPresenter;
    let mut ctx = ActionContext::new(state, fixture.env(), &mut presenter);
    let records = queue.flush(&mut ctx, u32::MAX);
    Ok((records, ctx.take_fired()))
}
