use arrayvec::ArrayVec;
use tracing::debug;

use crate::action::{ActionIntent, ActionKind, ActionQueue, Denial, RuleContext};
use crate::config::GameConfig;
use crate::state::ActorId;

/// Returned when an actor's backlog is at capacity.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("intent backlog of {actor} is full")]
pub struct BacklogFull {
    pub actor: ActorId,
    pub intent: ActionIntent,
}

/// Bounded FIFO of intents waiting for the actor's turn.
#[derive(Clone, Debug, Default)]
pub struct IntentBacklog {
    intents: ArrayVec<ActionIntent, { GameConfig::MAX_INTENT_BACKLOG }>,
}

impl IntentBacklog {
    pub fn push(&mut self, intent: ActionIntent) -> Result<(), ActionIntent> {
        self.intents.try_push(intent).map_err(|err| err.element())
    }

    pub fn pop_front(&mut self) -> Option<ActionIntent> {
        self.intents.pop_at(0)
    }

    pub fn clear(&mut self) {
        self.intents.clear();
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.intents.is_full()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionIntent> {
        self.intents.iter()
    }
}

/// Outcome of [`Actor::try_enqueue_action`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TryEnqueue {
    /// Not this actor's turn, the queue is busy, or nothing is waiting.
    Idle,
    /// A plan was enqueued. Entries that failed before it are reported.
    Dispatched {
        kind: ActionKind,
        denials: Vec<Denial>,
    },
    /// Every waiting intent was rejected; the backlog is now empty.
    Exhausted { denials: Vec<Denial> },
}

impl TryEnqueue {
    pub fn denials(&self) -> &[Denial] {
        match self {
            Self::Idle => &[],
            Self::Dispatched { denials, .. } | Self::Exhausted { denials } => denials,
        }
    }
}

/// Server-local controller of one seat.
///
/// Gameplay fields live in the replicated
/// [`ActorState`](crate::state::ActorState); the backlog stays here so it can
/// never diverge between processes.
#[derive(Clone, Debug)]
pub struct Actor {
    id: ActorId,
    backlog: IntentBacklog,
}

impl Actor {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            backlog: IntentBacklog::default(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn backlog(&self) -> &IntentBacklog {
        &self.backlog
    }

    /// Queues an intent for this actor's next opportunity to act. Intents
    /// that name no actor are stamped with this one.
    pub fn submit(&mut self, mut intent: ActionIntent) -> Result<(), BacklogFull> {
        intent.actor.get_or_insert(self.id);
        self.backlog.push(intent).map_err(|intent| BacklogFull {
            actor: self.id,
            intent,
        })
    }

    /// Called when this actor's turn opens. Intents from a previous turn are
    /// discarded.
    pub fn start_turn(&mut self) {
        if !self.backlog.is_empty() {
            debug!(actor = %self.id, dropped = self.backlog.len(), "stale backlog cleared");
        }
        self.backlog.clear();
    }

    /// Dispatches the first backlog entry that validates.
    ///
    /// A no-op unless this actor holds the turn and the queue is idle. Entries
    /// are popped in FIFO order; rejected ones are dropped and reported.
    pub fn try_enqueue_action(
        &mut self,
        queue: &mut ActionQueue,
        rules: &RuleContext<'_>,
    ) -> TryEnqueue {
        if queue.is_running() || rules.state.turn.current_actor != Some(self.id) {
            return TryEnqueue::Idle;
        }
        if self.backlog.is_empty() {
            return TryEnqueue::Idle;
        }

        let mut denials = Vec::new();
        while let Some(intent) = self.backlog.pop_front() {
            match queue.try_create_execution_plan(rules, &intent) {
                Ok(plan) => {
                    let kind = plan.kind();
                    queue.enqueue(plan);
                    return TryEnqueue::Dispatched { kind, denials };
                }
                Err(reason) => denials.push(Denial::new(intent, reason)),
            }
        }
        TryEnqueue::Exhausted { denials }
    }
}
