use tracing::error;

use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, Cue, ExecutionPlan,
    IntentOrigin, IntentPayload, PlanData, Rejection, RuleContext, SpawnData, ViewContext,
};
use crate::state::UnitState;

/// Places a new unit on the board. Only the system may spawn.
#[derive(Debug, Default)]
pub struct SpawnHandler {
    timer: AnimationTimer,
}

impl ActionHandler for SpawnHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::Spawn
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
        let IntentPayload::Spawn {
            owner,
            unit_type,
            position,
        } = intent.payload
        else {
            return Err(Rejection::Unresolved(ActionKind::Spawn));
        };
        if intent.origin != IntentOrigin::System {
            return Err(Rejection::NotPermitted(ActionKind::Spawn));
        }

        let state = rules.state;
        let env = rules.env;
        let actor = state.actor(owner).ok_or(Rejection::UnknownActor(owner))?;
        if actor.defeated {
            return Err(Rejection::ActorDefeated(owner));
        }
        let definition = env
            .types()
            .unit_type(unit_type)
            .ok_or(Rejection::UnknownUnitType(unit_type))?;
        let tile = state
            .tile_view(env.map(), position)
            .ok_or(Rejection::OutOfBounds(position))?;
        if !tile.is_passable() {
            return Err(Rejection::Blocked(position));
        }
        if let Some(occupant) = tile.occupant() {
            return Err(Rejection::Occupied { position, occupant });
        }

        plan.resolve(PlanData::Spawn(SpawnData {
            entity: state.peek_entity_id(),
            owner,
            unit_type,
            position,
            health: definition.max_health,
            cloaked: definition.has_cloak(),
        }));
        Ok(())
    }

    fn present(&self, view: &mut ViewContext<'_>, data: &PlanData) {
        if let PlanData::Spawn(data) = data {
            view.cue(Cue::UnitSpawned {
                entity: data.entity,
                position: data.position,
            });
        }
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::Spawn(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };
        if ctx.state.entities.contains(data.entity) {
            error!(target: "action::commit", entity = %data.entity, "spawn id already in use");
            return;
        }

        let unit = UnitState::new(
            data.entity,
            data.owner,
            data.unit_type,
            data.position,
            data.health,
        )
        .with_cloak(data.cloaked);
        let map = ctx.env.map();
        if let Err(err) = ctx.state.insert_unit(map, unit) {
            error!(target: "action::commit", entity = %data.entity, "spawn failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionIntent, ActionQueue, IntentOrigin, Rejection};
    use crate::fixtures::{self, BLUE, Fixture, INFANTRY, RED, SCOUT};
    use crate::state::{EntityId, Position};

    #[test]
    fn system_spawn_allocates_the_next_id() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (0, 0));
        let mut queue = ActionQueue::default();

        let intent = ActionIntent::spawn(BLUE, SCOUT, Position::new(5, 5));
        fixtures::run(&mut queue, &mut state, &fixture, intent).unwrap();

        let spawned = state.unit(EntityId(6)).unwrap();
        assert_eq!(spawned.owner, BLUE);
        assert!(spawned.cloaked);
        assert_eq!(state.unit_at(Position::new(5, 5)).map(|u| u.id), Some(EntityId(6)));
        assert!(state.actor(BLUE).unwrap().entities.contains(&EntityId(6)));
        assert_eq!(state.peek_entity_id(), EntityId(7));
    }

    #[test]
    fn players_cannot_spawn() {
        let fixture = Fixture::skirmish();
        let state = fixture.state();
        let queue = ActionQueue::default();

        let mut intent = ActionIntent::spawn(RED, INFANTRY, Position::new(1, 1)).with_actor(RED);
        intent.origin = IntentOrigin::Actor;
        let err = queue
            .try_create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap_err();
        assert_eq!(err, Rejection::NotPermitted(crate::action::ActionKind::Spawn));
    }

    #[test]
    fn spawn_requires_a_free_passable_tile() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (0, 0));
        let queue = ActionQueue::default();
        let rules = fixture.rules(&state);

        let occupied = ActionIntent::spawn(BLUE, INFANTRY, Position::new(0, 0));
        assert!(matches!(
            queue.try_create_execution_plan(&rules, &occupied),
            Err(Rejection::Occupied { .. })
        ));

        let wall = ActionIntent::spawn(BLUE, INFANTRY, fixtures::WALL);
        assert_eq!(
            queue.try_create_execution_plan(&rules, &wall).unwrap_err(),
            Rejection::Blocked(fixtures::WALL)
        );
    }
}
