//! Turn control: who may act now, and the per-actor intent backlog.
//!
//! [`TurnManager`] reads the replicated [`TurnState`](crate::state::TurnState);
//! [`Actor`] is the server-local controller that feeds the queue from a
//! bounded FIFO of submitted intents.
mod actor;
mod manager;

pub use actor::{Actor, BacklogFull, IntentBacklog, TryEnqueue};
pub use manager::{NextTurn, TurnManager};
