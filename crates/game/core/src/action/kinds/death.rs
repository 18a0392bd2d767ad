use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, Cue, DeathData,
    ExecutionPlan, IntentPayload, PlanData, Rejection, RuleContext, ViewContext,
};

/// Removes a unit whose health reached zero.
#[derive(Debug, Default)]
pub struct DeathHandler {
    timer: AnimationTimer,
}

impl ActionHandler for DeathHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::Death
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
        let IntentPayload::Death { entity } = intent.payload else {
            return Err(Rejection::Unresolved(ActionKind::Death));
        };
        if intent.is_from_actor() {
            return Err(Rejection::NotPermitted(ActionKind::Death));
        }

        let state = rules.state;
        let unit = state.unit(entity).ok_or(Rejection::UnknownEntity(entity))?;
        if unit.is_alive() {
            return Err(Rejection::TargetAlive(entity));
        }

        plan.resolve(PlanData::Death(DeathData {
            entity,
            owner: unit.owner,
            position: unit.position,
        }));

        let last_unit = state.actor(unit.owner).is_some_and(|owner| {
            !owner.defeated && owner.entities.len() == 1 && owner.entities.contains(&entity)
        });
        if last_unit {
            plan.add_next(ActionIntent::chained(IntentPayload::Surrender {
                actor: unit.owner,
            }));
        }
        Ok(())
    }

    fn present(&self, view: &mut ViewContext<'_>, data: &PlanData) {
        if let PlanData::Death(data) = data {
            view.cue(Cue::UnitDied {
                entity: data.entity,
            });
        }
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::Death(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };

        let state = &mut *ctx.state;
        state
            .world
            .tile_map
            .remove_occupant(&data.position, data.entity);
        state.entities.remove(data.entity);
        if let Some(owner) = state.actor_mut(data.owner) {
            owner.entities.remove(&data.entity);
        }
    }
}
