use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, ExecutionPlan,
    IntentPayload, PlanData, Rejection, RuleContext, SurrenderData,
};

/// Removes an actor from play along with every unit it still owns.
#[derive(Debug, Default)]
pub struct SurrenderHandler {
    timer: AnimationTimer,
}

impl ActionHandler for SurrenderHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::Surrender
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
        let IntentPayload::Surrender { actor } = intent.payload else {
            return Err(Rejection::Unresolved(ActionKind::Surrender));
        };
        if intent.is_from_actor() && intent.actor != Some(actor) {
            return Err(Rejection::NotPermitted(ActionKind::Surrender));
        }

        let state = rules.state;
        let seat = state.actor(actor).ok_or(Rejection::UnknownActor(actor))?;
        if seat.defeated {
            return Err(Rejection::ActorDefeated(actor));
        }

        let held_turn = state.turn.current_actor == Some(actor);
        plan.resolve(PlanData::Surrender(SurrenderData {
            actor,
            held_turn,
            units: seat.entities.iter().copied().collect(),
        }));
        if held_turn {
            plan.add_next(ActionIntent::system(IntentPayload::EndTurn).with_actor(actor));
        }
        Ok(())
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::Surrender(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };

        let state = &mut *ctx.state;
        for &entity in &data.units {
            if let Some(unit) = state.entities.remove(entity) {
                state.world.tile_map.remove_occupant(&unit.position, entity);
            }
        }
        if let Some(actor) = state.actor_mut(data.actor) {
            actor.entities.clear();
            actor.defeated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionIntent, ActionKind, ActionQueue, Rejection};
    use crate::fixtures::{self, BLUE, Fixture, INFANTRY, RED};
    use crate::state::{ActorPhase, EntityId};

    #[test]
    fn surrendering_on_own_turn_passes_the_turn() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (1, 1));
        fixtures::place(&mut state, &fixture, 6, RED, INFANTRY, (1, 2));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (6, 6));
        fixtures::open_turn(&mut state, RED);
        let mut queue = ActionQueue::default();

        let records =
            fixtures::run(&mut queue, &mut state, &fixture, ActionIntent::surrender(RED)).unwrap();

        let kinds: Vec<_> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Surrender, ActionKind::EndTurn, ActionKind::StartTurn]
        );
        let red = state.actor(RED).unwrap();
        assert!(red.defeated);
        assert_eq!(red.phase, ActorPhase::Idle);
        assert!(state.unit(EntityId(5)).is_none());
        assert!(state.unit(EntityId(6)).is_none());
        assert_eq!(state.entities.len(), 1);
        assert_eq!(state.turn.current_actor, Some(BLUE));
    }

    #[test]
    fn actors_may_only_surrender_themselves() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::open_turn(&mut state, RED);
        let queue = ActionQueue::default();

        let mut intent = ActionIntent::surrender(BLUE);
        intent.actor = Some(RED);
        let err = queue
            .try_create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap_err();
        assert_eq!(err, Rejection::NotPermitted(ActionKind::Surrender));
    }
}
