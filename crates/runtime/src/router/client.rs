//! Replaying router.
//!
//! Applies server-confirmed batches verbatim: plans are rebuilt from their
//! records and run through the full handler lifecycle for presentation.
//! Nothing is re-validated or re-derived.
use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use game_core::{
    ActionContext, ActionIntent, ActionKind, ActionQueue, ActorId, EntityId, ExecutionPlan,
    GameState, IntentOrigin, PlanData, PlanRecord, Position, Presenter, RuleContext,
};

use super::prediction::{PredictError, PredictedPlan, Reconciliation};
use crate::oracle::OracleBundle;
use crate::transport::{TickBatch, TransportError};

/// A batch reference that cannot exist in the local state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Desync {
    #[error("{kind} plan references unknown entity {entity}")]
    UnknownEntity { kind: ActionKind, entity: EntityId },

    #[error("{kind} plan references unknown actor {actor}")]
    UnknownActor { kind: ActionKind, actor: ActorId },

    #[error("{kind} plan references tile {position} outside the map")]
    OutOfBounds { kind: ActionKind, position: Position },

    #[error("spawn reuses live entity id {entity}")]
    DuplicateEntity { entity: EntityId },
}

#[derive(Debug, Error)]
pub enum ReplayError {
    /// The batch was refused in full; local state is untouched.
    #[error("protocol desync: {0}")]
    ProtocolDesync(#[from] Desync),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct ClientRouter {
    state: GameState,
    oracles: OracleBundle,
    queue: ActionQueue,
    presenter: Box<dyn Presenter>,
    /// Entities alive once every accepted batch has been applied.
    known: BTreeSet<EntityId>,
    prediction: Option<PredictedPlan>,
}

impl ClientRouter {
    pub fn new(state: GameState, oracles: OracleBundle, presenter: impl Presenter + 'static) -> Self {
        let known = state.entities.iter().map(|unit| unit.id).collect();
        Self {
            state,
            oracles,
            queue: ActionQueue::default(),
            presenter: Box::new(presenter),
            known,
            prediction: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// True when every accepted plan has been applied.
    pub fn is_idle(&self) -> bool {
        !self.queue.is_running()
    }

    pub fn pending_prediction(&self) -> Option<&PredictedPlan> {
        self.prediction.as_ref()
    }

    /// Checks `batch` against local knowledge and queues its plans.
    ///
    /// Returns how many plans were queued. A batch that fails the check is
    /// refused in full.
    pub fn accept_batch(&mut self, batch: TickBatch) -> Result<usize, ReplayError> {
        self.known = self.verify_batch(&batch)?;

        let mut plans = batch.plans.into_iter().peekable();
        if let Some(confirmed) = plans.peek()
            && let Some(prediction) = self.prediction.take()
        {
            match prediction.reconcile(confirmed, &mut self.state) {
                Reconciliation::Confirmed => {
                    debug!(target: "runtime::client", kind = %confirmed.kind(), "prediction confirmed");
                    plans.next();
                }
                Reconciliation::Mispredicted => {
                    warn!(target: "runtime::client", kind = %confirmed.kind(), "prediction rolled back");
                    self.queue.clear();
                }
            }
        }

        let mut queued = 0;
        for record in plans {
            if self.queue.enqueue(ExecutionPlan::from_record(record)) {
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Advances the replay by one frame. Returns a plan committed during it.
    pub fn tick(&mut self, dt_ms: u32) -> Option<PlanRecord> {
        let mut ctx =
            ActionContext::new(&mut self.state, self.oracles.env(), self.presenter.as_mut());
        self.queue.tick(&mut ctx, dt_ms)
    }

    /// Applies every queued plan without waiting for animations.
    pub fn flush(&mut self) -> Vec<PlanRecord> {
        let mut ctx =
            ActionContext::new(&mut self.state, self.oracles.env(), self.presenter.as_mut());
        self.queue.flush(&mut ctx, u32::MAX)
    }

    /// Resolves and applies `intent` locally ahead of the server.
    ///
    /// Only allowed while the replay is idle. The next accepted batch settles
    /// the prediction. Like server submissions, the intent counts as
    /// actor-originated whatever origin the caller set.
    pub fn predict(&mut self, intent: &ActionIntent) -> Result<PlanRecord, PredictError> {
        if self.queue.is_running() || self.prediction.is_some() {
            return Err(PredictError::Busy);
        }
        let mut intent = intent.clone();
        intent.origin = IntentOrigin::Actor;
        let rules = RuleContext::new(&self.state, self.oracles.env());
        let plan = self.queue.try_create_execution_plan(&rules, &intent)?;
        let record = plan
            .to_record()
            .ok_or(PredictError::Rejected(game_core::Rejection::Unresolved(
                intent.kind(),
            )))?;

        self.prediction = Some(PredictedPlan::new(record.clone(), self.state.clone()));
        self.queue
            .enqueue(ExecutionPlan::from_record(record.clone()));
        Ok(record)
    }

    /// Every entity, actor and tile the batch names must exist once the
    /// batch's earlier plans have applied. Returns the entity set after it.
    fn verify_batch(&self, batch: &TickBatch) -> Result<BTreeSet<EntityId>, Desync> {
        let mut known = self.known.clone();
        for record in &batch.plans {
            let check = Check {
                kind: record.kind(),
                state: &self.state,
                oracles: &self.oracles,
            };
            match record.data() {
                PlanData::StartTurn(data) => check.actor(data.actor)?,
                PlanData::EndTurn(data) => check.actor(data.actor)?,
                PlanData::Move(data) => {
                    check.entity(&known, data.entity)?;
                    check.actor(data.actor)?;
                    for &position in &data.path {
                        check.tile(position)?;
                    }
                }
                PlanData::Attack(data) => {
                    check.entity(&known, data.entity)?;
                    check.entity(&known, data.target)?;
                    check.actor(data.actor)?;
                    for resolution in &data.resolutions {
                        check.entity(&known, resolution.entity)?;
                    }
                }
                PlanData::Death(data) => {
                    check.entity(&known, data.entity)?;
                    check.actor(data.owner)?;
                    check.tile(data.position)?;
                    known.remove(&data.entity);
                }
                PlanData::Spawn(data) => {
                    check.actor(data.owner)?;
                    check.tile(data.position)?;
                    if !known.insert(data.entity) {
                        return Err(Desync::DuplicateEntity {
                            entity: data.entity,
                        });
                    }
                }
                PlanData::Surrender(data) => {
                    check.actor(data.actor)?;
                    for unit in &data.units {
                        check.entity(&known, *unit)?;
                        known.remove(unit);
                    }
                }
            }
        }
        Ok(known)
    }
}

struct Check<'a> {
    kind: ActionKind,
    state: &'a GameState,
    oracles: &'a OracleBundle,
}

impl Check<'_> {
    fn entity(&self, known: &BTreeSet<EntityId>, entity: EntityId) -> Result<(), Desync> {
        if known.contains(&entity) {
            Ok(())
        } else {
            Err(Desync::UnknownEntity {
                kind: self.kind,
                entity,
            })
        }
    }

    fn actor(&self, actor: ActorId) -> Result<(), Desync> {
        if self.state.actors.contains_key(&actor) {
            Ok(())
        } else {
            Err(Desync::UnknownActor {
                kind: self.kind,
                actor,
            })
        }
    }

    fn tile(&self, position: Position) -> Result<(), Desync> {
        if self.oracles.env().map().contains(position) {
            Ok(())
        } else {
            Err(Desync::OutOfBounds {
                kind: self.kind,
                position,
            })
        }
    }
}

impl std::fmt::Debug for ClientRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRouter")
            .field("turn", &self.state.turn)
            .field("queue", &self.queue)
            .field("predicting", &self.prediction.is_some())
            .finish_non_exhaustive()
    }
}
