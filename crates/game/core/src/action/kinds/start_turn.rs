use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, Cue, ExecutionPlan,
    PlanData, Rejection, RuleContext, StartTurnData, ViewContext,
};
use crate::turn::TurnManager;

/// Opens the next actor's turn.
#[derive(Debug, Default)]
pub struct StartTurnHandler {
    timer: AnimationTimer,
}

impl ActionHandler for StartTurnHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::StartTurn
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
        if intent.is_from_actor() {
            return Err(Rejection::NotPermitted(ActionKind::StartTurn));
        }
        let turn = &rules.state.turn;
        if turn.is_open() {
            return Err(Rejection::TurnInProgress);
        }

        let next = TurnManager::next_turn(rules.state)?;
        plan.resolve(PlanData::StartTurn(StartTurnData {
            actor: next.actor,
            index: next.index as u32,
            turn: turn.turn + 1,
            round: turn.round + u32::from(next.wrapped),
        }));
        Ok(())
    }

    fn present(&self, view: &mut ViewContext<'_>, data: &PlanData) {
        if let PlanData::StartTurn(data) = data {
            view.cue(Cue::TurnBanner {
                actor: data.actor,
                round: data.round,
            });
        }
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::StartTurn(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };

        let turn = &mut ctx.state.turn;
        turn.cursor = Some(data.index as usize);
        turn.current_actor = Some(data.actor);
        turn.turn = data.turn;
        turn.round = data.round;
        if let Some(actor) = ctx.state.actor_mut(data.actor) {
            actor.start_turn();
        }
    }
}
