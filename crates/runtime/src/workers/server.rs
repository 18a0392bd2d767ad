//! Server worker that owns the authoritative [`ServerRouter`].
//!
//! Receives commands from [`ServerHandle`](crate::api::ServerHandle), pumps
//! the router on a fixed interval and broadcasts each tick's batch.
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use game_core::{ActionIntent, GameState, PlanRecord};

use super::respond;
use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, MatchEvent, extract_turn_events};
use crate::router::ServerRouter;
use crate::transport::BatchSink;

/// Commands that can be sent to the server worker.
pub enum ServerCommand {
    Submit {
        intent: ActionIntent,
        reply: oneshot::Sender<Result<()>>,
    },
    ForceEnqueue {
        intent: ActionIntent,
        reply: oneshot::Sender<Result<()>>,
    },
    BeginMatch {
        reply: oneshot::Sender<Result<()>>,
    },
    /// One pump outside the interval.
    Pump { reply: oneshot::Sender<u32> },
    QueryState { reply: oneshot::Sender<GameState> },
    /// Flush what is pending and stop, even while handles are still alive.
    Shutdown,
}

pub struct ServerWorker {
    router: ServerRouter,
    command_rx: mpsc::Receiver<ServerCommand>,
    event_bus: EventBus,
    sink: Arc<dyn BatchSink>,
    tick: Duration,
}

impl ServerWorker {
    pub fn new(
        router: ServerRouter,
        command_rx: mpsc::Receiver<ServerCommand>,
        event_bus: EventBus,
        sink: Arc<dyn BatchSink>,
        tick: Duration,
    ) -> Self {
        info!(
            target: "runtime::server",
            actors = router.state().actors.len(),
            units = router.state().entities.len(),
            tick_ms = tick.as_millis() as u64,
            "server worker initialized"
        );

        Self {
            router,
            command_rx,
            event_bus,
            sink,
            tick,
        }
    }

    /// Main worker loop. Ends on [`ServerCommand::Shutdown`] or once every
    /// handle is dropped.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let flow = tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => ControlFlow::Break(()),
                },
                _ = ticker.tick() => {
                    self.router.pump();
                    self.flush().await;
                    ControlFlow::Continue(())
                }
            };
            if flow.is_break() {
                break;
            }
        }
        debug!(target: "runtime::server", nonce = self.router.state().turn.nonce, "server worker stopped");
    }

    /// Every command flushes before it replies, so a caller that saw the
    /// reply can rely on the batch already being on the transport.
    async fn handle_command(&mut self, command: ServerCommand) -> ControlFlow<()> {
        match command {
            ServerCommand::Submit { intent, reply } => {
                let result = self.router.submit(intent).map_err(RuntimeError::from);
                self.flush().await;
                respond(reply, result, "Submit");
            }
            ServerCommand::ForceEnqueue { intent, reply } => {
                let result = self.router.force_enqueue(intent).map_err(RuntimeError::from);
                self.flush().await;
                respond(reply, result, "ForceEnqueue");
            }
            ServerCommand::BeginMatch { reply } => {
                let result = self.router.begin_match().map_err(RuntimeError::from);
                self.flush().await;
                respond(reply, result, "BeginMatch");
            }
            ServerCommand::Pump { reply } => {
                let committed = self.router.pump();
                self.flush().await;
                respond(reply, committed, "Pump");
            }
            ServerCommand::QueryState { reply } => {
                respond(reply, self.router.state().clone(), "QueryState");
            }
            ServerCommand::Shutdown => {
                info!(target: "runtime::server", "shutdown requested");
                self.flush().await;
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Publishes denials, then sends and announces the pending batch.
    async fn flush(&mut self) {
        for denial in self.router.take_denials() {
            debug!(
                target: "runtime::server",
                kind = %denial.intent.kind(),
                reason = %denial.reason,
                "intent denied"
            );
            self.event_bus
                .publish(Event::Match(MatchEvent::IntentDenied(denial)));
        }

        let Some(batch) = self.router.take_batch() else {
            return;
        };
        if let Err(err) = self.sink.send(&batch).await {
            error!(target: "runtime::server", error = %err, plans = batch.plans.len(), "batch broadcast failed");
            return;
        }

        for event in extract_turn_events(batch.plans.iter().map(PlanRecord::data)) {
            self.event_bus.publish(Event::Turn(event));
        }
        let nonce = self.router.state().turn.nonce;
        debug!(target: "runtime::server", plans = batch.plans.len(), nonce, "batch broadcast");
        self.event_bus
            .publish(Event::Match(MatchEvent::BatchBroadcast {
                plans: batch.plans.len(),
                events: batch.events,
                nonce,
            }));
    }
}
