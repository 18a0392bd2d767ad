use crate::action::{
    ActionContext, ActionHandler, ActionIntent, ActionKind, AnimationTimer, AttackData, Cue,
    ExecutionPlan, IntentOrigin, IntentPayload, PlanData, PlanFlags, Rejection, Resolution,
    RuleContext, ViewContext, combat,
};

use super::authorize;

/// Resolves one exchange of damage. Lethal hits chain a death; survivors may
/// answer with an immediate counter.
#[derive(Debug, Default)]
pub struct AttackHandler {
    timer: AnimationTimer,
}

impl ActionHandler for AttackHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::Attack
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
        let IntentPayload::Attack {
            entity,
            target,
            roll,
        } = intent.payload
        else {
            return Err(Rejection::Unresolved(ActionKind::Attack));
        };
        let state = rules.state;
        let types = rules.env.types();

        let attacker = state.unit(entity).ok_or(Rejection::UnknownEntity(entity))?;
        let owner = authorize(state, intent, attacker)?;
        if !attacker.is_alive() {
            return Err(Rejection::Incapacitated(entity));
        }
        let defender = state.unit(target).ok_or(Rejection::UnknownEntity(target))?;
        if !defender.is_alive() {
            return Err(Rejection::TargetDead(target));
        }
        if !state.are_hostile(entity, target) {
            return Err(Rejection::FriendlyTarget(target));
        }
        if intent.is_from_actor() && defender.cloaked {
            return Err(Rejection::TargetHidden(target));
        }

        let attacker_type = types
            .unit_type(attacker.unit_type)
            .ok_or(Rejection::UnknownUnitType(attacker.unit_type))?;
        let defender_type = types
            .unit_type(defender.unit_type)
            .ok_or(Rejection::UnknownUnitType(defender.unit_type))?;
        if !combat::in_range(attacker_type, attacker.position, defender.position) {
            return Err(Rejection::OutOfRange { entity, target });
        }

        let dealt = combat::damage(attacker_type, defender_type, roll);
        let health = defender.health.saturating_sub(dealt);

        let mut flags = PlanFlags::empty();
        let is_counter = intent.origin == IntentOrigin::Reaction;
        if is_counter {
            flags |= PlanFlags::COUNTER;
        }
        if attacker.cloaked {
            flags |= PlanFlags::UNCLOAK;
        }
        if health == 0 {
            flags |= PlanFlags::LETHAL;
        }
        if intent.is_from_actor() {
            flags |= PlanFlags::CONSUMES_ACTION;
        }

        plan.resolve(PlanData::Attack(AttackData {
            entity,
            target,
            actor: owner,
            resolutions: vec![Resolution {
                entity: target,
                health,
            }],
            flags,
        }));

        if health == 0 {
            plan.add_next(ActionIntent::chained(IntentPayload::Death { entity: target }));
        } else if !is_counter
            && combat::retaliates(defender_type, defender.position, attacker.position)
        {
            plan.add_next(
                ActionIntent::reaction(IntentPayload::Attack {
                    entity: target,
                    target: entity,
                    roll: combat::derive_roll(state, target, entity),
                })
                .with_actor(defender.owner),
            );
        }
        Ok(())
    }

    fn present(&self, view: &mut ViewContext<'_>, data: &PlanData) {
        if let PlanData::Attack(data) = data {
            view.cue(Cue::AttackSwing {
                attacker: data.entity,
                defender: data.target,
                counter: data.flags.contains(PlanFlags::COUNTER),
            });
        }
    }

    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        let PlanData::Attack(data) = data else {
            super::foreign_data(self.kind(), data);
            return;
        };

        let state = &mut *ctx.state;
        for resolution in &data.resolutions {
            if let Some(unit) = state.unit_mut(resolution.entity) {
                unit.health = resolution.health;
            }
        }
        if data.flags.contains(PlanFlags::UNCLOAK)
            && let Some(unit) = state.unit_mut(data.entity)
        {
            unit.cloaked = false;
        }
        if data.flags.contains(PlanFlags::CONSUMES_ACTION)
            && let Some(actor) = state.actor_mut(data.actor)
        {
            actor.spend_action();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{
        ActionIntent, ActionKind, ActionQueue, IntentOrigin, IntentPayload, PlanData, PlanFlags,
        Rejection,
    };
    use crate::fixtures::{self, ARCHER, BLUE, Fixture, INFANTRY, RED, SCOUT};
    use crate::state::EntityId;

    #[test]
    fn lethal_attack_chains_exactly_one_death() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (3, 3));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (3, 2));
        fixtures::open_turn(&mut state, RED);
        state.unit_mut(EntityId(9)).unwrap().health = 1;
        let queue = ActionQueue::default();

        let intent = ActionIntent::attack(RED, EntityId(5), EntityId(9), 0);
        let plan = queue
            .create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap();

        let Some(PlanData::Attack(data)) = plan.data() else {
            panic!("expected attack data");
        };
        assert!(data.flags.contains(PlanFlags::LETHAL));
        assert_eq!(data.resolutions[0].health, 0);
        assert_eq!(plan.chain().len(), 1);
        assert_eq!(
            plan.chain()[0].payload,
            IntentPayload::Death {
                entity: EntityId(9)
            }
        );
    }

    #[test]
    fn death_cascade_clears_the_board() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (3, 3));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (3, 2));
        fixtures::place(&mut state, &fixture, 10, BLUE, INFANTRY, (7, 7));
        fixtures::open_turn(&mut state, RED);
        state.unit_mut(EntityId(9)).unwrap().health = 1;
        let mut queue = ActionQueue::default();

        let intent = ActionIntent::attack(RED, EntityId(5), EntityId(9), 0);
        let records = fixtures::run(&mut queue, &mut state, &fixture, intent).unwrap();

        let kinds: Vec<_> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, vec![ActionKind::Attack, ActionKind::Death]);
        assert!(state.unit(EntityId(9)).is_none());
        assert!(state.unit_at(crate::state::Position::new(3, 2)).is_none());
        assert!(!state.actor(BLUE).unwrap().entities.contains(&EntityId(9)));
        assert!(!state.actor(BLUE).unwrap().defeated);
    }

    #[test]
    fn survivors_counter_immediately() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (3, 3));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (3, 2));
        fixtures::open_turn(&mut state, RED);
        let mut queue = ActionQueue::default();

        let intent = ActionIntent::attack(RED, EntityId(5), EntityId(9), 0);
        let plan = queue
            .create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap();
        assert_eq!(plan.chain().len(), 1);
        assert_eq!(plan.chain()[0].origin, IntentOrigin::Reaction);

        let records = fixtures::run(&mut queue, &mut state, &fixture, intent).unwrap();
        assert_eq!(records.len(), 2);
        let PlanData::Attack(counter) = records[1].data() else {
            panic!("expected a counter attack");
        };
        assert!(counter.flags.contains(PlanFlags::COUNTER));
        assert!(!counter.flags.contains(PlanFlags::CONSUMES_ACTION));
        assert_eq!(counter.entity, EntityId(9));
        assert!(state.unit(EntityId(5)).unwrap().health < 10);
        // 10 health, 5 attack vs 2 defense at roll 0.
        assert_eq!(state.unit(EntityId(9)).unwrap().health, 7);
    }

    #[test]
    fn ranged_attacks_are_not_countered_by_melee() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, ARCHER, (3, 4));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (3, 2));
        fixtures::open_turn(&mut state, RED);
        let queue = ActionQueue::default();

        let intent = ActionIntent::attack(RED, EntityId(5), EntityId(9), 50);
        let plan = queue
            .create_execution_plan(&fixture.rules(&state), &intent)
            .unwrap();
        assert!(plan.chain().is_empty());
    }

    #[test]
    fn rejects_friendly_hidden_and_distant_targets() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (3, 3));
        fixtures::place(&mut state, &fixture, 6, RED, INFANTRY, (3, 4));
        fixtures::place(&mut state, &fixture, 7, BLUE, SCOUT, (2, 3));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (6, 6));
        fixtures::open_turn(&mut state, RED);
        let queue = ActionQueue::default();
        let rules = fixture.rules(&state);

        let reject = |target| {
            queue
                .try_create_execution_plan(
                    &rules,
                    &ActionIntent::attack(RED, EntityId(5), EntityId(target), 0),
                )
                .unwrap_err()
        };

        assert_eq!(reject(6), Rejection::FriendlyTarget(EntityId(6)));
        assert_eq!(reject(7), Rejection::TargetHidden(EntityId(7)));
        assert_eq!(
            reject(9),
            Rejection::OutOfRange {
                entity: EntityId(5),
                target: EntityId(9)
            }
        );
        assert_eq!(reject(42), Rejection::UnknownEntity(EntityId(42)));
    }
}
