use crate::env::GameEnv;
use crate::state::{EventId, GameState};

use super::{ActionKind, Cue, PlanData, Presenter};

/// Read-only view used while resolving intents.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub state: &'a GameState,
    pub env: GameEnv<'a>,
}

impl<'a> RuleContext<'a> {
    pub fn new(state: &'a GameState, env: GameEnv<'a>) -> Self {
        Self { state, env }
    }
}

/// Presentation-phase context: gameplay state is read-only.
pub struct ViewContext<'a> {
    pub state: &'a GameState,
    pub env: GameEnv<'a>,
    presenter: &'a mut dyn Presenter,
}

impl<'a> ViewContext<'a> {
    pub fn cue(&mut self, cue: Cue) {
        self.presenter.cue(cue);
    }

    pub fn animation_duration(&self, kind: ActionKind, data: &PlanData) -> u32 {
        self.presenter.animation_duration(kind, data)
    }
}

/// Commit-phase context. The only place gameplay state is mutable.
pub struct ActionContext<'a> {
    pub state: &'a mut GameState,
    pub env: GameEnv<'a>,
    presenter: &'a mut dyn Presenter,
    fired: Vec<EventId>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        state: &'a mut GameState,
        env: GameEnv<'a>,
        presenter: &'a mut dyn Presenter,
    ) -> Self {
        Self {
            state,
            env,
            presenter,
            fired: Vec::new(),
        }
    }

    pub fn rules(&self) -> RuleContext<'_> {
        RuleContext::new(&*self.state, self.env)
    }

    pub fn view(&mut self) -> ViewContext<'_> {
        ViewContext {
            state: &*self.state,
            env: self.env,
            presenter: &mut *self.presenter,
        }
    }

    pub fn cue(&mut self, cue: Cue) {
        self.presenter.cue(cue);
    }

    /// Records a world event triggered by the commit in progress.
    pub fn fire(&mut self, event: EventId) {
        self.presenter.cue(Cue::WorldEvent { event });
        self.fired.push(event);
    }

    /// Drains the events fired since the last call.
    pub fn take_fired(&mut self) -> Vec<EventId> {
        std::mem::take(&mut self.fired)
    }
}
