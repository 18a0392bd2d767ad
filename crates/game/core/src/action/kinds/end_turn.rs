use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, EndTurnData,
    ExecutionPlan, PlanData, Rejection, RuleContext,
};

/// Closes the current turn and chains the next one.
#[derive(Debug, Default)]
pub struct EndTurnHandler {
    timer: AnimationTimer,
}

impl ActionHandler for EndTurnHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::EndTurn
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
        let current = rules.state.turn.current_actor.ok_or(Rejection::NoTurnOpen)?;
        match intent.actor {
            Some(requested) if requested != current => {
                return Err(Rejection::NotYourTurn(requested));
            }
            None if intent.is_from_actor() => return Err(Rejection::MissingActor),
            _ => {}
        }

        plan.resolve(PlanData::EndTurn(EndTurnData { actor: current }));
        plan.add_next(ActionIntent::start_turn());
        Ok(())
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::EndTurn(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };

        if let Some(actor) = ctx.state.actor_mut(data.actor) {
            actor.end_turn();
        }
        ctx.state.turn.current_actor = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionIntent, ActionKind, ActionQueue, Rejection};
    use crate::fixtures::{self, BLUE, Fixture, RED};

    #[test]
    fn only_the_current_actor_may_end_the_turn() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::open_turn(&mut state, RED);
        let queue = ActionQueue::default();

        let err = queue
            .try_create_execution_plan(&fixture.rules(&state), &ActionIntent::end_turn(BLUE))
            .unwrap_err();
        assert_eq!(err, Rejection::NotYourTurn(BLUE));

        let plan = queue
            .create_execution_plan(&fixture.rules(&state), &ActionIntent::end_turn(RED))
            .unwrap();
        assert_eq!(plan.chain().len(), 1);
        assert_eq!(plan.chain()[0].kind(), ActionKind::StartTurn);
    }

    #[test]
    fn rejected_without_an_open_turn() {
        let fixture = Fixture::skirmish();
        let state = fixture.state();
        let queue = ActionQueue::default();

        let err = queue
            .try_create_execution_plan(&fixture.rules(&state), &ActionIntent::end_turn(RED))
            .unwrap_err();
        assert_eq!(err, Rejection::NoTurnOpen);
    }
}
