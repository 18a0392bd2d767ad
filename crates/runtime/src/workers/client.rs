//! Client worker that replays server batches through a [`ClientRouter`].
//!
//! Batches arrive from a [`BatchSource`]; the replay advances on a frame
//! interval. A refused batch ends the session.
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use game_core::{ActionIntent, GameState, PlanRecord};

use super::respond;
use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, ReplayEvent};
use crate::router::{ClientRouter, ReplayError};
use crate::transport::{BatchSource, TickBatch, TransportError};

/// Commands that can be sent to a client worker.
pub enum ClientCommand {
    QueryState {
        reply: oneshot::Sender<GameState>,
    },
    /// Drain delivered batches and finish the replay at once.
    Settle {
        reply: oneshot::Sender<Result<GameState>>,
    },
    Predict {
        intent: ActionIntent,
        reply: oneshot::Sender<Result<PlanRecord>>,
    },
    Shutdown,
}

pub struct ClientWorker {
    index: usize,
    router: ClientRouter,
    source: Box<dyn BatchSource>,
    command_rx: mpsc::Receiver<ClientCommand>,
    event_bus: EventBus,
    frame: Duration,
    connected: bool,
}

impl ClientWorker {
    pub fn new(
        index: usize,
        router: ClientRouter,
        source: Box<dyn BatchSource>,
        command_rx: mpsc::Receiver<ClientCommand>,
        event_bus: EventBus,
        frame: Duration,
    ) -> Self {
        Self {
            index,
            router,
            source,
            command_rx,
            event_bus,
            frame,
            connected: true,
        }
    }

    /// Main worker loop. Ends on [`ClientCommand::Shutdown`], when every
    /// handle is dropped, or when the replay desyncs.
    pub async fn run(mut self) {
        info!(target: "runtime::client", client = self.index, "client worker started");
        let frame_ms = u32::try_from(self.frame.as_millis()).unwrap_or(u32::MAX);
        let mut frames = time::interval(self.frame);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let flow = tokio::select! {
                received = self.source.recv(), if self.connected => self.receive(received),
                _ = frames.tick() => {
                    self.router.tick(frame_ms);
                    ControlFlow::Continue(())
                }
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => ControlFlow::Break(()),
                },
            };
            if flow.is_break() {
                break;
            }
        }
        debug!(
            target: "runtime::client",
            client = self.index,
            nonce = self.router.state().turn.nonce,
            "client worker stopped"
        );
    }

    fn receive(&mut self, received: std::result::Result<TickBatch, TransportError>) -> ControlFlow<()> {
        let result = match received {
            Ok(batch) => self.accept(batch),
            Err(TransportError::Closed) => {
                debug!(target: "runtime::client", client = self.index, "server closed the transport");
                self.connected = false;
                Ok(())
            }
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                self.report(&err);
                ControlFlow::Break(())
            }
        }
    }

    fn accept(&mut self, batch: TickBatch) -> std::result::Result<(), ReplayError> {
        let plans = self.router.accept_batch(batch)?;
        self.event_bus
            .publish(Event::Replay(ReplayEvent::BatchAccepted {
                client: self.index,
                plans,
            }));
        Ok(())
    }

    /// Accepts everything already delivered without waiting.
    fn drain(&mut self) -> std::result::Result<(), ReplayError> {
        while self.connected {
            match self.source.try_recv() {
                Ok(Some(batch)) => self.accept(batch)?,
                Ok(None) => break,
                Err(TransportError::Closed) => self.connected = false,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn handle_command(&mut self, command: ClientCommand) -> ControlFlow<()> {
        match command {
            ClientCommand::QueryState { reply } => {
                respond(reply, self.router.state().clone(), "QueryState");
            }
            ClientCommand::Settle { reply } => {
                if let Err(err) = self.drain() {
                    self.report(&err);
                    respond(reply, Err(RuntimeError::Desync(err)), "Settle");
                    return ControlFlow::Break(());
                }
                self.router.flush();
                respond(reply, Ok(self.router.state().clone()), "Settle");
            }
            ClientCommand::Predict { intent, reply } => {
                let result = self.router.predict(&intent).map_err(RuntimeError::from);
                respond(reply, result, "Predict");
            }
            ClientCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn report(&self, err: &ReplayError) {
        error!(target: "runtime::client", client = self.index, error = %err, "replay stopped");
        self.event_bus
            .publish(Event::Replay(ReplayEvent::Desync {
                client: self.index,
                reason: err.to_string(),
            }));
    }
}
