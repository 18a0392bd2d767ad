//! Action domain: intents, handlers, plans and the queue that drains them.
//!
//! # Flow
//!
//! 1. An [`ActionIntent`] is handed to [`ActionQueue::create_execution_plan`].
//! 2. The registered [`ActionHandler`] validates it and resolves every outcome
//!    into the plan's [`PlanData`], optionally chaining follow-up intents.
//! 3. The queue runs one plan at a time through `on_start` → `on_update`×N →
//!    `is_finished` → `on_end`. Only `on_end` mutates [`GameState`].
//! 4. After the commit the chain is re-validated against the new state.
//!
//! # Module Structure
//!
//! - `kind` / `intent`: what is being requested
//! - `plan`: resolved outcomes and their wire form
//! - `context`: rule, view and commit contexts
//! - `cue`: presentation hooks
//! - `error`: [`Rejection`] and [`Denial`]
//! - `registry` / `queue`: handler lookup and serial draining
//! - `combat`: damage and roll helpers shared by handlers
//! - `kinds`: one handler per [`ActionKind`]
//!
//! [`GameState`]: crate::state::GameState

pub mod combat;
mod context;
mod cue;
mod error;
mod intent;
mod kind;
pub mod kinds;
mod plan;
mod queue;
mod registry;

pub use context::{ActionContext, RuleContext, ViewContext};
pub use cue::{Cue, NullPresenter, Presenter, RecordingPresenter};
pub use error::{Denial, Rejection};
pub use intent::{ActionIntent, IntentOrigin, IntentPayload};
pub use kind::ActionKind;
pub use plan::{
    AttackData, DeathData, EndTurnData, ExecutionPlan, MoveData, PlanData, PlanFlags, PlanRecord,
    Resolution, RunState, SpawnData, StartTurnData, SurrenderData,
};
pub use queue::ActionQueue;
pub use registry::ActionRegistry;

/// Transient run field shared by handlers: time spent in the active phase.
///
/// Reset on activation and on commit, so a handler never carries state from
/// one plan into the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationTimer {
    elapsed_ms: u32,
}

impl AnimationTimer {
    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    pub fn advance(&mut self, dt_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// One handler per [`ActionKind`].
///
/// Implementors provide resolution and commit; the timed lifecycle around them
/// has defaults driven by the handler's [`AnimationTimer`] and the
/// presenter's animation durations.
pub trait ActionHandler: Send {
    fn kind(&self) -> ActionKind;

    fn timer(&self) -> &AnimationTimer;

    fn timer_mut(&mut self) -> &mut AnimationTimer;

    /// Validates `intent` against the current state and, if legal, resolves
    /// the outcome into `plan` and schedules follow-ups with
    /// [`ExecutionPlan::add_next`].
    ///
    /// Must be a pure function of (state, intent). On `Err` the plan stays
    /// unresolved.
    fn fill_execution_plan(
        &self,
        rules: &RuleContext<'_>,
        plan: &mut ExecutionPlan,
        intent: &ActionIntent,
    ) -> Result<(), Rejection>;

    /// Applies resolved data to the state. Called exactly once per plan.
    fn commit(&self, ctx: &mut ActionContext<'_>, data: &PlanData);

    /// Presentation emitted on activation.
    fn present(&self, _view: &mut ViewContext<'_>, _data: &PlanData) {}

    /// Fires once when the plan becomes active. Presentation only.
    fn on_start(&mut self, view: &mut ViewContext<'_>, data: &PlanData) {
        self.timer_mut().reset();
        self.present(view, data);
    }

    /// Fires every tick while the plan is active.
    fn on_update(&mut self, _view: &mut ViewContext<'_>, _data: &PlanData, dt_ms: u32) {
        self.timer_mut().advance(dt_ms);
    }

    fn is_finished(&self, view: &ViewContext<'_>, data: &PlanData) -> bool {
        self.timer().elapsed_ms() >= view.animation_duration(self.kind(), data)
    }

    /// Commits the plan. The queue re-validates the chain afterwards.
    fn on_end(&mut self, ctx: &mut ActionContext<'_>, data: &PlanData) {
        self.timer_mut().reset();
        self.commit(ctx, data);
    }
}
