//! Action routers: the boundary between the deterministic queue and the
//! outside world.
//!
//! [`ServerRouter`] validates, executes and batches plans authoritatively.
//! [`ClientRouter`] replays server-confirmed batches for presentation only.
//! The two are chosen at construction; core logic never asks which side it
//! runs on.
mod client;
mod prediction;
mod schedule;
mod server;

pub use client::{ClientRouter, Desync, ReplayError};
pub use prediction::{PredictError, PredictedPlan, Reconciliation};
pub use schedule::EventSchedule;
pub use server::{ServerRouter, SubmitError};
