//! Worker tasks that back the runtime orchestration.
//!
//! The server worker owns the authoritative router and broadcasts batches;
//! each client worker owns one replaying router fed by the transport.

mod client;
mod server;

pub use client::{ClientCommand, ClientWorker};
pub use server::{ServerCommand, ServerWorker};

use tokio::sync::oneshot;
use tracing::debug;

pub(crate) fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "runtime::worker", command, "reply channel closed (caller dropped)");
    }
}
