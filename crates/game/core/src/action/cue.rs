//! Presentation hooks.
//!
//! Handlers and the queue emit [`Cue`]s while plans run. A presenter may play
//! animations, log, or ignore them; it can never affect gameplay state.
use crate::state::{ActorId, EntityId, EventId, Position};

use super::{ActionKind, PlanData};

/// Fire-and-forget presentation signal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    PlanStarted {
        kind: ActionKind,
    },
    PlanEnded {
        kind: ActionKind,
    },
    TurnBanner {
        actor: ActorId,
        round: u32,
    },
    UnitStep {
        entity: EntityId,
        from: Position,
        to: Position,
    },
    AttackSwing {
        attacker: EntityId,
        defender: EntityId,
        counter: bool,
    },
    UnitDied {
        entity: EntityId,
    },
    UnitSpawned {
        entity: EntityId,
        position: Position,
    },
    WorldEvent {
        event: EventId,
    },
}

/// Presentation collaborator.
pub trait Presenter: Send {
    fn cue(&mut self, cue: Cue);

    /// Milliseconds a plan's animation lasts. `is_finished` polls against it.
    fn animation_duration(&self, _kind: ActionKind, _data: &PlanData) -> u32 {
        0
    }
}

/// Presenter for headless simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn cue(&mut self, _cue: Cue) {}
}

/// Records cues in order. Useful for asserting lifecycle ordering.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresenter {
    pub cues: Vec<Cue>,
    pub duration_ms: u32,
}

impl RecordingPresenter {
    pub fn with_duration(duration_ms: u32) -> Self {
        Self {
            cues: Vec::new(),
            duration_ms,
        }
    }
}

impl Presenter for RecordingPresenter {
    fn cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    fn animation_duration(&self, _kind: ActionKind, _data: &PlanData) -> u32 {
        self.duration_ms
    }
}
