//! Presenter used by replaying clients when no UI is attached.

use game_core::{ActionKind, Cue, PlanData, Presenter};
use tracing::debug;

/// Logs every cue and paces plans with fixed animation timings.
#[derive(Clone, Debug)]
pub struct TracingPresenter {
    client: usize,
    step_ms: u32,
    action_ms: u32,
}

impl TracingPresenter {
    pub const DEFAULT_STEP_MS: u32 = 40;
    pub const DEFAULT_ACTION_MS: u32 = 120;

    pub fn new(client: usize) -> Self {
        Self {
            client,
            step_ms: Self::DEFAULT_STEP_MS,
            action_ms: Self::DEFAULT_ACTION_MS,
        }
    }

    pub fn with_timings(mut self, step_ms: u32, action_ms: u32) -> Self {
        self.step_ms = step_ms;
        self.action_ms = action_ms;
        self
    }
}

impl Presenter for TracingPresenter {
    fn cue(&mut self, cue: Cue) {
        debug!(target: "runtime::presentation", client = self.client, ?cue);
    }

    fn animation_duration(&self, _kind: ActionKind, data: &PlanData) -> u32 {
        match data {
            PlanData::Move(step) => {
                let steps = step.path.len().saturating_sub(1) as u32;
                self.step_ms.saturating_mul(steps)
            }
            PlanData::Attack(_) | PlanData::Death(_) | PlanData::Spawn(_) => self.action_ms,
            PlanData::StartTurn(_) | PlanData::EndTurn(_) | PlanData::Surrender(_) => 0,
        }
    }
}
