use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, Cue, ExecutionPlan,
    IntentPayload, MoveData, PlanData, PlanFlags, Rejection, RuleContext, ViewContext, combat,
};
use crate::config::HostileMovePolicy;
use crate::env::{PathRequest, StaticTile, UnitType};
use crate::state::{ActorId, EntityId, GameState, Position, UnitState};

use super::authorize;

/// Walks a unit along a path; may stop short of a hostile and chain an attack.
#[derive(Debug, Default)]
pub struct MoveHandler {
    timer: AnimationTimer,
}

impl ActionHandler for MoveHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::Move
    }

    fn timer(&self) -> &AnimationTimer {
        &self.timer
    }

    fn timer_mut(&mut self) -> &mut AnimationTimer {
        &mut self.timer
    }

    fn fill_execution_plan(
        &self,
        rules: &RuleContext<'_>,
        plan: &mut ExecutionPlan,
        intent: &ActionIntent,
    ) -> Result<(), Rejection> {
        let IntentPayload::Move { entity, target } = intent.payload else {
            return Err(Rejection::Unresolved(ActionKind::Move));
        };
        let state = rules.state;
        let env = rules.env;

        let unit = state.unit(entity).ok_or(Rejection::UnknownEntity(entity))?;
        let owner = authorize(state, intent, unit)?;
        if !unit.is_alive() {
            return Err(Rejection::Incapacitated(entity));
        }
        if unit.position == target {
            return Err(Rejection::AlreadyThere(entity));
        }
        let tile = env.map().tile(target).ok_or(Rejection::OutOfBounds(target))?;
        if !tile.is_passable() {
            return Err(Rejection::Blocked(target));
        }
        let unit_type = env
            .types()
            .unit_type(unit.unit_type)
            .ok_or(Rejection::UnknownUnitType(unit.unit_type))?;

        let mut flags = PlanFlags::empty();
        if intent.is_from_actor() {
            flags |= PlanFlags::CONSUMES_ACTION;
        }

        match state.world.tile_map.occupant(&target) {
            None => {
                let request = PathRequest {
                    entity,
                    from: unit.position,
                    to: target,
                    max_steps: unit_type.move_range,
                };
                let path = env
                    .paths()
                    .find_path(env.map(), state, &request)
                    .ok_or(Rejection::Unreachable(target))?;
                if unit.cloaked && ends_next_to_hostile(state, entity, target) {
                    flags |= PlanFlags::UNCLOAK;
                }
                plan.resolve(PlanData::Move(MoveData {
                    entity,
                    actor: owner,
                    path,
                    flags,
                    trigger: tile.trigger(),
                }));
                Ok(())
            }
            Some(occupant) if !state.are_hostile(entity, occupant) => Err(Rejection::Occupied {
                position: target,
                occupant,
            }),
            Some(occupant) => match env.config().hostile_move {
                HostileMovePolicy::Reject => Err(Rejection::Occupied {
                    position: target,
                    occupant,
                }),
                HostileMovePolicy::AttackFromPath => {
                    let approach = Approach {
                        unit,
                        unit_type,
                        owner,
                        hostile: occupant,
                        hostile_at: target,
                    };
                    approach.resolve(rules, plan, flags | PlanFlags::ATTACK_MOVE)
                }
            },
        }
    }

    fn present(&self, view: &mut ViewContext<'_>, data: &PlanData) {
        if let PlanData::Move(data) = data
            && let (Some(from), Some(to)) = (data.origin(), data.destination())
        {
            view.cue(Cue::UnitStep {
                entity: data.entity,
                from,
                to,
            });
        }
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::Move(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };
        let (Some(from), Some(to)) = (data.origin(), data.destination()) else {
            return;
        };

        let state = &mut *ctx.state;
        if from != to {
            state.world.tile_map.remove_occupant(&from, data.entity);
            state.world.tile_map.add_occupant(to, data.entity);
        }
        if let Some(unit) = state.unit_mut(data.entity) {
            unit.position = to;
            if data.flags.contains(PlanFlags::UNCLOAK) {
                unit.cloaked = false;
            }
        }
        if data.flags.contains(PlanFlags::CONSUMES_ACTION)
            && let Some(actor) = state.actor_mut(data.actor)
        {
            actor.spend_action();
        }
        if let Some(event) = data.trigger {
            ctx.fire(event);
        }
    }
}

fn ends_next_to_hostile(state: &GameState, entity: EntityId, at: Position) -> bool {
    at.neighbors().iter().any(|neighbor| {
        state
            .world
            .tile_map
            .occupant(neighbor)
            .is_some_and(|other| other != entity && state.are_hostile(entity, other))
    })
}

/// Resolution of a move aimed at a tile held by a hostile.
struct Approach<'a> {
    unit: &'a UnitState,
    unit_type: &'a UnitType,
    owner: ActorId,
    hostile: EntityId,
    hostile_at: Position,
}

impl Approach<'_> {
    fn resolve(
        &self,
        rules: &RuleContext<'_>,
        plan: &mut ExecutionPlan,
        mut flags: PlanFlags,
    ) -> Result<(), Rejection> {
        let state = rules.state;
        let env = rules.env;
        let entity = self.unit.id;

        let request = PathRequest {
            entity,
            from: self.unit.position,
            to: self.hostile_at,
            max_steps: self
                .unit_type
                .move_range
                .saturating_add(self.unit_type.attack_range.max),
        };
        let path = env
            .paths()
            .find_path(env.map(), state, &request)
            .ok_or(Rejection::Unreachable(self.hostile_at))?;

        // First tile along the path, within move range, from which the
        // hostile can be hit. The hostile's own tile is never a candidate.
        let reachable = path
            .len()
            .saturating_sub(1)
            .min(self.unit_type.move_range as usize + 1);
        let stop = path[..reachable]
            .iter()
            .position(|&step| {
                let free = step == self.unit.position
                    || state.world.tile_map.occupant(&step).is_none();
                free && combat::in_range(self.unit_type, step, self.hostile_at)
            })
            .ok_or(Rejection::OutOfRange {
                entity,
                target: self.hostile,
            })?;

        let prefix = path[..=stop].to_vec();
        let destination = prefix[stop];
        if self.unit.cloaked && ends_next_to_hostile(state, entity, destination) {
            flags |= PlanFlags::UNCLOAK;
        }
        let trigger = if stop > 0 {
            env.map().tile(destination).and_then(StaticTile::trigger)
        } else {
            None
        };

        plan.resolve(PlanData::Move(MoveData {
            entity,
            actor: self.owner,
            path: prefix,
            flags,
            trigger,
        }));
        plan.add_next(
            ActionIntent::chained(IntentPayload::Attack {
                entity,
                target: self.hostile,
                roll: combat::derive_roll(state, entity, self.hostile),
            })
            .with_actor(self.owner),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{
        ActionIntent, ActionKind, ActionQueue, IntentPayload, PlanData, PlanFlags, Rejection,
    };
    use crate::config::{GameConfig, HostileMovePolicy};
    use crate::fixtures::{self, BLUE, Fixture, INFANTRY, RED, SCOUT};
    use crate::state::{EntityId, EventId, Position};

    fn board(config: GameConfig) -> (Fixture, crate::state::GameState) {
        let fixture = Fixture::skirmish().with_config(config);
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (3, 3));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (3, 2));
        fixtures::open_turn(&mut state, RED);
        (fixture, state)
    }

    #[test]
    fn move_onto_hostile_attacks_from_current_tile() {
        let (fixture, state) = board(GameConfig::default());
        let queue = ActionQueue::default();
        let intent = ActionIntent::move_unit(RED, EntityId(5), Position::new(3, 2));

        let plan = queue
            .create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap();

        let Some(PlanData::Move(data)) = plan.data() else {
            panic!("expected move data");
        };
        assert_eq!(data.path, vec![Position::new(3, 3)]);
        assert!(data.flags.contains(PlanFlags::ATTACK_MOVE));
        assert_eq!(plan.chain().len(), 1);
        assert!(matches!(
            plan.chain()[0].payload,
            IntentPayload::Attack {
                entity: EntityId(5),
                target: EntityId(9),
                ..
            }
        ));
    }

    #[test]
    fn move_onto_hostile_is_rejected_under_reject_policy() {
        let (fixture, state) =
            board(GameConfig::default().with_hostile_move(HostileMovePolicy::Reject));
        let queue = ActionQueue::default();
        let intent = ActionIntent::move_unit(RED, EntityId(5), Position::new(3, 2));

        let err = queue
            .try_create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::Occupied {
                position: Position::new(3, 2),
                occupant: EntityId(9)
            }
        );
    }

    #[test]
    fn move_onto_ally_is_rejected() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (3, 3));
        fixtures::place(&mut state, &fixture, 9, RED, INFANTRY, (3, 2));
        fixtures::open_turn(&mut state, RED);
        let queue = ActionQueue::default();

        let intent = ActionIntent::move_unit(RED, EntityId(5), Position::new(3, 2));
        assert!(queue
            .create_execution_plan(&fixture.rules(&state), &intent)
            .is_none());
    }

    #[test]
    fn attack_move_walks_until_in_range() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (1, 5));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (1, 2));
        fixtures::open_turn(&mut state, RED);
        let mut queue = ActionQueue::default();

        let intent = ActionIntent::move_unit(RED, EntityId(5), Position::new(1, 2));
        let records = fixtures::run(&mut queue, &mut state, &fixture, intent).unwrap();

        let kinds: Vec<_> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds[..2], [ActionKind::Move, ActionKind::Attack]);
        assert_eq!(state.unit(EntityId(5)).unwrap().position, Position::new(1, 3));
        assert!(state.unit(EntityId(9)).unwrap().health < 10);
        // Move spent the action; the chained attack did not.
        assert_eq!(state.actor(RED).unwrap().actions_taken, 1);
    }

    #[test]
    fn commit_updates_occupancy_and_fires_triggers() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (6, 3));
        fixtures::open_turn(&mut state, RED);
        let mut queue = ActionQueue::default();

        let intent = ActionIntent::move_unit(RED, EntityId(5), fixtures::TRIGGER_TILE);
        let (records, fired) =
            fixtures::run_with_events(&mut queue, &mut state, &fixture, intent).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(fired, vec![fixtures::TRIGGER_EVENT]);
        assert_eq!(state.unit_at(fixtures::TRIGGER_TILE).map(|u| u.id), Some(EntityId(5)));
        assert!(state.unit_at(Position::new(6, 3)).is_none());
        assert_eq!(fired[0], EventId(100));
    }

    #[test]
    fn cloaked_unit_reveals_itself_next_to_hostiles() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, SCOUT, (0, 0));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (2, 1));
        fixtures::open_turn(&mut state, RED);
        let mut queue = ActionQueue::default();
        assert!(state.unit(EntityId(5)).unwrap().cloaked);

        let intent = ActionIntent::move_unit(RED, EntityId(5), Position::new(2, 0));
        fixtures::run(&mut queue, &mut state, &fixture, intent).unwrap();

        assert!(!state.unit(EntityId(5)).unwrap().cloaked);
    }

    #[test]
    fn gating_rejects_foreign_units_and_empty_budgets() {
        let (fixture, mut state) = board(GameConfig::default());
        let queue = ActionQueue::default();

        let foreign = ActionIntent::move_unit(RED, EntityId(9), Position::new(3, 1));
        assert_eq!(
            queue
                .try_create_execution_plan(&fixture.rules(&state), &foreign)
                .unwrap_err(),
            Rejection::NotOwner {
                actor: RED,
                entity: EntityId(9)
            }
        );

        let off_turn = ActionIntent::move_unit(BLUE, EntityId(9), Position::new(3, 1));
        assert_eq!(
            queue
                .try_create_execution_plan(&fixture.rules(&state), &off_turn)
                .unwrap_err(),
            Rejection::NotYourTurn(BLUE)
        );

        let red = state.actor_mut(RED).unwrap();
        red.actions_taken = red.max_actions_per_turn;
        let exhausted = ActionIntent::move_unit(RED, EntityId(5), Position::new(3, 4));
        assert_eq!(
            queue
                .try_create_execution_plan(&fixture.rules(&state), &exhausted)
                .unwrap_err(),
            Rejection::NoActionsLeft(RED)
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let (fixture, state) = board(GameConfig::default());
        let queue = ActionQueue::default();
        let intent = ActionIntent::move_unit(RED, EntityId(5), Position::new(3, 2));

        let first = queue.create_execution_plan(&fixture.rules(&state), &intent);
        let second = queue.create_execution_plan(&fixture.rules(&state), &intent);
        assert_eq!(first, second);
    }
}
