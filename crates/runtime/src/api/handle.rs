//! Cloneable façades for issuing commands to the runtime workers.
//!
//! [`ServerHandle`] talks to the authoritative worker, [`ClientHandle`] to one
//! replaying client. Both hide the channel plumbing behind async helpers.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use game_core::{ActionIntent, GameState, PlanRecord};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{ClientCommand, ServerCommand};

async fn request<C, T>(
    tx: &mpsc::Sender<C>,
    command: impl FnOnce(oneshot::Sender<T>) -> C,
) -> Result<T> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(command(reply_tx))
        .await
        .map_err(|_| RuntimeError::CommandChannelClosed)?;
    reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
}

/// Handle to the authoritative server worker.
#[derive(Clone)]
pub struct ServerHandle {
    command_tx: mpsc::Sender<ServerCommand>,
    event_bus: EventBus,
}

impl ServerHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<ServerCommand>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Queues a player intent on its actor's backlog.
    pub async fn submit(&self, intent: ActionIntent) -> Result<()> {
        request(&self.command_tx, |reply| ServerCommand::Submit { intent, reply }).await?
    }

    /// Validates and runs a system intent immediately.
    pub async fn force_enqueue(&self, intent: ActionIntent) -> Result<()> {
        request(&self.command_tx, |reply| ServerCommand::ForceEnqueue {
            intent,
            reply,
        })
        .await?
    }

    /// Opens the first turn of the match.
    pub async fn begin_match(&self) -> Result<()> {
        request(&self.command_tx, |reply| ServerCommand::BeginMatch { reply }).await?
    }

    /// Runs one pump outside the tick interval. Returns how many plans
    /// committed.
    pub async fn pump_now(&self) -> Result<u32> {
        request(&self.command_tx, |reply| ServerCommand::Pump { reply }).await
    }

    /// Asks the worker to stop. Other clones of this handle fail with
    /// [`RuntimeError::CommandChannelClosed`] afterwards.
    pub(crate) async fn request_shutdown(&self) {
        if self.command_tx.send(ServerCommand::Shutdown).await.is_err() {
            debug!(target: "runtime", "server worker already stopped");
        }
    }

    /// Query the current authoritative state (read-only snapshot).
    pub async fn query_state(&self) -> Result<GameState> {
        request(&self.command_tx, |reply| ServerCommand::QueryState { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Match` - Outgoing batches and denied intents
    /// - `Topic::Turn` - Turn lifecycle derived from committed plans
    /// - `Topic::Replay` - Client progress and desyncs
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

/// Handle to one replaying client worker.
#[derive(Clone)]
pub struct ClientHandle {
    index: usize,
    command_tx: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    pub(crate) fn new(index: usize, command_tx: mpsc::Sender<ClientCommand>) -> Self {
        Self { index, command_tx }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The client's local state, mid-animation if a replay is running.
    pub async fn query_state(&self) -> Result<GameState> {
        request(&self.command_tx, |reply| ClientCommand::QueryState { reply }).await
    }

    /// Accepts every batch already delivered, applies all queued plans
    /// without waiting for animations and returns the resulting state.
    pub async fn settle(&self) -> Result<GameState> {
        request(&self.command_tx, |reply| ClientCommand::Settle { reply }).await?
    }

    pub(crate) async fn request_shutdown(&self) {
        if self.command_tx.send(ClientCommand::Shutdown).await.is_err() {
            debug!(target: "runtime", client = self.index, "client worker already stopped");
        }
    }

    /// Applies `intent` locally ahead of server confirmation.
    pub async fn predict(&self, intent: ActionIntent) -> Result<PlanRecord> {
        request(&self.command_tx, |reply| ClientCommand::Predict { intent, reply }).await?
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
