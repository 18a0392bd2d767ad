//! Authoritative router.
//!
//! Owns the canonical [`GameState`], the action queue and one [`Actor`]
//! controller per seat. Every committed plan lands in an outbox that the
//! worker drains into one [`TickBatch`] per tick.
use std::collections::{BTreeMap, VecDeque};

use thiserror::Error;
use tracing::{debug, trace};

use game_core::{
    ActionContext, ActionIntent, ActionQueue, Actor, ActorId, BacklogFull, Denial, EventId,
    GameState, IntentOrigin, NullPresenter, PlanData, PlanRecord, Rejection, RuleContext,
    TryEnqueue,
};

use super::EventSchedule;
use crate::oracle::OracleBundle;
use crate::transport::TickBatch;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("intent names no actor")]
    MissingActor,

    #[error("actor {0} is not seated")]
    UnknownActor(ActorId),

    #[error(transparent)]
    BacklogFull(#[from] BacklogFull),
}

pub struct ServerRouter {
    state: GameState,
    oracles: OracleBundle,
    queue: ActionQueue,
    actors: BTreeMap<ActorId, Actor>,
    schedule: EventSchedule,
    /// System intents waiting for the queue to go idle.
    scheduled: VecDeque<ActionIntent>,
    last_round: u32,
    outbox: TickBatch,
    denials: Vec<Denial>,
}

impl ServerRouter {
    pub fn new(state: GameState, oracles: OracleBundle) -> Self {
        let actors = state
            .turn
            .order
            .iter()
            .map(|&id| (id, Actor::new(id)))
            .collect();
        let last_round = state.turn.round;

        Self {
            state,
            oracles,
            queue: ActionQueue::default(),
            actors,
            schedule: EventSchedule::default(),
            scheduled: VecDeque::new(),
            last_round,
            outbox: TickBatch::default(),
            denials: Vec::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: EventSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn oracles(&self) -> &OracleBundle {
        &self.oracles
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// True when nothing is running and nothing is waiting to run.
    pub fn is_idle(&self) -> bool {
        !self.queue.is_running() && self.scheduled.is_empty()
    }

    /// Queues a player intent on its actor's backlog.
    ///
    /// Submitted intents always count as actor-originated, whatever origin
    /// the caller set.
    pub fn submit(&mut self, mut intent: ActionIntent) -> Result<(), SubmitError> {
        let id = intent.actor.ok_or(SubmitError::MissingActor)?;
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or(SubmitError::UnknownActor(id))?;
        intent.origin = IntentOrigin::Actor;
        actor.submit(intent)?;
        Ok(())
    }

    /// Validates a system intent, enqueues it and drains the queue at once.
    ///
    /// Exempt from actor gating and from the per-tick cap.
    pub fn force_enqueue(&mut self, intent: ActionIntent) -> Result<(), Rejection> {
        let rules = RuleContext::new(&self.state, self.oracles.env());
        let plan = self.queue.try_create_execution_plan(&rules, &intent)?;
        self.queue.enqueue(plan);
        self.run(u32::MAX, false);
        Ok(())
    }

    /// Opens the first turn.
    pub fn begin_match(&mut self) -> Result<(), Rejection> {
        self.force_enqueue(ActionIntent::start_turn())
    }

    /// Runs up to `max_actions_per_tick` plans. Returns how many committed.
    ///
    /// Whenever the queue goes idle, scheduled system intents go first, then
    /// the current actor may dispatch its next backlog entry.
    pub fn pump(&mut self) -> u32 {
        let budget = self.oracles.config().max_actions_per_tick;
        self.run(budget, true)
    }

    /// Everything committed since the last call, if anything was.
    pub fn take_batch(&mut self) -> Option<TickBatch> {
        if self.outbox.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.outbox))
    }

    pub fn take_denials(&mut self) -> Vec<Denial> {
        std::mem::take(&mut self.denials)
    }

    fn run(&mut self, budget: u32, dispatch_actor: bool) -> u32 {
        let mut committed = 0;
        while committed < budget {
            if !self.queue.is_running() && !self.feed(dispatch_actor) {
                break;
            }
            if self.flush_one() {
                committed += 1;
            }
        }
        committed
    }

    /// Puts the next plan on an idle queue. False when there is none.
    fn feed(&mut self, dispatch_actor: bool) -> bool {
        while let Some(intent) = self.scheduled.pop_front() {
            let rules = RuleContext::new(&self.state, self.oracles.env());
            match self.queue.try_create_execution_plan(&rules, &intent) {
                Ok(plan) => {
                    self.queue.enqueue(plan);
                    return true;
                }
                Err(reason) => self.denials.push(Denial::new(intent, reason)),
            }
        }

        if !dispatch_actor {
            return false;
        }
        let Some(actor) = self
            .state
            .turn
            .current_actor
            .and_then(|id| self.actors.get_mut(&id))
        else {
            return false;
        };

        let rules = RuleContext::new(&self.state, self.oracles.env());
        let outcome = actor.try_enqueue_action(&mut self.queue, &rules);
        self.denials.extend(outcome.denials().iter().cloned());
        matches!(outcome, TryEnqueue::Dispatched { .. })
    }

    fn flush_one(&mut self) -> bool {
        let mut presenter = NullPresenter;
        let mut ctx = ActionContext::new(&mut self.state, self.oracles.env(), &mut presenter);
        let Some(record) = self.queue.flush_plan(&mut ctx) else {
            return false;
        };
        let fired = ctx.take_fired();
        drop(ctx);

        self.observe(&record, &fired);
        self.outbox.plans.push(record);
        self.outbox.events.extend(fired);
        true
    }

    fn observe(&mut self, record: &PlanRecord, fired: &[EventId]) {
        trace!(target: "runtime::server", kind = %record.kind(), nonce = self.state.turn.nonce, "plan committed");

        if let PlanData::StartTurn(start) = record.data() {
            if let Some(actor) = self.actors.get_mut(&start.actor) {
                actor.start_turn();
            }
            if start.round != self.last_round {
                self.last_round = start.round;
                let due = self.schedule.round_started(start.round);
                if !due.is_empty() {
                    debug!(target: "runtime::server", round = start.round, count = due.len(), "round schedule due");
                }
                self.scheduled.extend(due);
            }
        }
        for &event in fired {
            let due = self.schedule.event_fired(event);
            if !due.is_empty() {
                debug!(target: "runtime::server", event = event.0, count = due.len(), "event schedule due");
            }
            self.scheduled.extend(due);
        }
    }
}

impl std::fmt::Debug for ServerRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerRouter")
            .field("turn", &self.state.turn)
            .field("queue", &self.queue)
            .field("scheduled", &self.scheduled.len())
            .field("outbox", &self.outbox.plans.len())
            .finish_non_exhaustive()
    }
}
