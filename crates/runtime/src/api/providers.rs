//! Asynchronous abstraction for sourcing seat intents.
//!
//! Runtime users plug in [`IntentProvider`] implementations so a match can
//! run with human input, scripted fixtures, or AI policies.
use async_trait::async_trait;

use game_core::action::combat;
use game_core::{
    ActionIntent, ActorId, GameConfig, GameEnv, GameState, PathRequest, Position, UnitState,
    UnitType,
};

use super::errors::{Result, RuntimeError};
use crate::oracle::OracleBundle;

/// Trait for providing a turn's worth of intents for one seat.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - AI decisions
/// - Scripted or replayed turns
/// - Testing fixtures
///
/// Returned intents go onto the actor's backlog in order, so at most
/// [`GameConfig::MAX_INTENT_BACKLOG`] are accepted per call.
#[async_trait]
pub trait IntentProvider: Send + Sync {
    async fn provide_intents(
        &self,
        actor: ActorId,
        state: &GameState,
        oracles: &OracleBundle,
    ) -> Result<Vec<ActionIntent>>;
}

/// Ends every turn immediately. Useful for testing or as a fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndTurnProvider;

#[async_trait]
impl IntentProvider for EndTurnProvider {
    async fn provide_intents(
        &self,
        actor: ActorId,
        _state: &GameState,
        _oracles: &OracleBundle,
    ) -> Result<Vec<ActionIntent>> {
        Ok(vec![ActionIntent::end_turn(actor)])
    }
}

/// Greedy skirmisher: each unit attacks the nearest visible hostile when it
/// can, otherwise walks toward it. Always closes with an end turn.
///
/// Intents are planned against one snapshot; later ones may be denied once
/// earlier ones change the board.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkirmishProvider;

#[async_trait]
impl IntentProvider for SkirmishProvider {
    async fn provide_intents(
        &self,
        actor: ActorId,
        state: &GameState,
        oracles: &OracleBundle,
    ) -> Result<Vec<ActionIntent>> {
        let seat = state.actor(actor).ok_or_else(|| RuntimeError::Provider {
            actor,
            reason: "actor is not seated".into(),
        })?;
        let env = oracles.env();
        let budget = usize::from(seat.max_actions_per_turn.saturating_sub(seat.actions_taken))
            .min(GameConfig::MAX_INTENT_BACKLOG - 1);

        let mut intents = Vec::with_capacity(budget + 1);
        for unit in state.entities.owned_by(actor).filter(|unit| unit.is_alive()) {
            if intents.len() >= budget {
                break;
            }
            let Some(unit_type) = env.types().unit_type(unit.unit_type) else {
                continue;
            };
            let Some(target) = nearest_hostile(state, unit) else {
                continue;
            };

            if combat::in_range(unit_type, unit.position, target.position) {
                let roll = combat::derive_roll(state, unit.id, target.id);
                intents.push(ActionIntent::attack(actor, unit.id, target.id, roll));
            } else if let Some(step) = approach(&env, state, unit, unit_type, target.position) {
                intents.push(ActionIntent::move_unit(actor, unit.id, step));
            }
        }
        intents.push(ActionIntent::end_turn(actor));
        Ok(intents)
    }
}

fn nearest_hostile<'a>(state: &'a GameState, unit: &UnitState) -> Option<&'a UnitState> {
    state
        .entities
        .iter()
        .filter(|other| other.is_alive() && !other.cloaked && state.are_hostile(unit.id, other.id))
        .min_by_key(|other| (unit.position.manhattan(other.position), other.id))
}

/// Furthest free tile this turn along the shortest route to a tile next to
/// `goal`.
fn approach(
    env: &GameEnv<'_>,
    state: &GameState,
    unit: &UnitState,
    unit_type: &UnitType,
    goal: Position,
) -> Option<Position> {
    let is_free = |position: Position| state.world.tile_map.occupant(&position).is_none();

    let path = goal
        .neighbors()
        .into_iter()
        .filter(|&position| {
            env.map()
                .tile(position)
                .is_some_and(|tile| tile.is_passable())
                && is_free(position)
        })
        .filter_map(|to| {
            let request = PathRequest {
                entity: unit.id,
                from: unit.position,
                to,
                max_steps: GameConfig::MAX_PATH_LEN as u32,
            };
            env.paths().find_path(env.map(), state, &request)
        })
        .min_by_key(|path| (path.len(), path.last().copied()))?;

    let reach = (unit_type.move_range as usize).min(path.len().saturating_sub(1));
    (1..=reach)
        .rev()
        .map(|step| path[step])
        .find(|&position| is_free(position))
}

#[cfg(test)]
mod tests {
    use game_core::IntentPayload;
    use game_core::fixtures::{self, BLUE, Fixture, INFANTRY, RED};
    use game_core::{ActionKind, EntityId};

    use super::*;

    fn oracles(fixture: &Fixture) -> OracleBundle {
        OracleBundle::new(
            fixture.map.clone(),
            fixture.types.clone(),
            fixture.config.clone(),
        )
    }

    #[tokio::test]
    async fn end_turn_provider_only_ends_the_turn() {
        let fixture = Fixture::skirmish();
        let intents = EndTurnProvider
            .provide_intents(RED, &fixture.state(), &oracles(&fixture))
            .await
            .unwrap();
        assert_eq!(intents, vec![ActionIntent::end_turn(RED)]);
    }

    #[tokio::test]
    async fn skirmisher_walks_next_to_a_distant_hostile() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (1, 1));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (3, 2));
        fixtures::open_turn(&mut state, RED);

        let intents = SkirmishProvider
            .provide_intents(RED, &state, &oracles(&fixture))
            .await
            .unwrap();

        assert_eq!(intents.len(), 2);
        let IntentPayload::Move { entity, target } = intents[0].payload else {
            panic!("expected a move, got {:?}", intents[0]);
        };
        assert_eq!(entity, EntityId(5));
        assert_eq!(target.manhattan(Position::new(3, 2)), 1);
        assert_eq!(intents[1].kind(), ActionKind::EndTurn);
    }

    #[tokio::test]
    async fn skirmisher_attacks_an_adjacent_hostile() {
        let fixture = Fixture::skirmish();
        let mut state = fixture.state();
        fixtures::place(&mut state, &fixture, 5, RED, INFANTRY, (1, 1));
        fixtures::place(&mut state, &fixture, 9, BLUE, INFANTRY, (2, 1));
        fixtures::open_turn(&mut state, RED);

        let intents = SkirmishProvider
            .provide_intents(RED, &state, &oracles(&fixture))
            .await
            .unwrap();

        assert!(matches!(
            intents[0].payload,
            IntentPayload::Attack {
                entity: EntityId(5),
                target: EntityId(9),
                ..
            }
        ));
        assert_eq!(intents.last().map(ActionIntent::kind), Some(ActionKind::EndTurn));
    }

    #[tokio::test]
    async fn unseated_actor_is_a_provider_error() {
        let fixture = Fixture::skirmish();
        let err = SkirmishProvider
            .provide_intents(game_core::ActorId(9), &fixture.state(), &oracles(&fixture))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Provider { .. }));
    }
}
