//! Client-side prediction.
//!
//! A client may apply its own actor's intent before the server confirms it.
//! The prediction keeps the state it replaced so a wrong guess can be rolled
//! back before the confirmed script is replayed.
use thiserror::Error;

use game_core::{GameState, PlanRecord, Rejection};

/// Locally resolved plan awaiting server confirmation.
#[derive(Clone, Debug)]
pub struct PredictedPlan {
    record: PlanRecord,
    snapshot: GameState,
}

/// Outcome of comparing a prediction with the server's record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// The server resolved the same data; local state stands.
    Confirmed,
    /// Local state was restored to the pre-prediction snapshot.
    Mispredicted,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("cannot predict while replaying or while a prediction is pending")]
    Busy,

    #[error(transparent)]
    Rejected(#[from] Rejection),
}

impl PredictedPlan {
    pub fn new(record: PlanRecord, snapshot: GameState) -> Self {
        Self { record, snapshot }
    }

    pub fn record(&self) -> &PlanRecord {
        &self.record
    }

    pub fn reconcile(self, confirmed: &PlanRecord, state: &mut GameState) -> Reconciliation {
        if self.record == *confirmed {
            Reconciliation::Confirmed
        } else {
            *state = self.snapshot;
            Reconciliation::Mispredicted
        }
    }
}
