//! High-level runtime orchestrator.
//!
//! The runtime owns the server worker and any replaying client workers,
//! wires up command, event and transport channels, and exposes a
//! builder-based API for driving a match.
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use game_content::MatchContent;
use game_core::{ActorId, GameConfig, GameState};

use crate::api::{ClientHandle, IntentProvider, Result, RuntimeError, ServerHandle};
use crate::events::EventBus;
use crate::oracle::OracleBundle;
use crate::presentation::TracingPresenter;
use crate::router::{ClientRouter, EventSchedule, ServerRouter};
use crate::transport::ChannelTransport;
use crate::workers::{ClientWorker, ServerWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Interval between server pumps.
    pub server_tick_ms: u64,
    /// Frame length used to advance client replays.
    pub client_frame_ms: u64,
    pub command_buffer: usize,
    pub event_buffer: usize,
    /// Batches a client may fall behind before it is cut off.
    pub transport_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            server_tick_ms: 50,
            client_frame_ms: 16,
            command_buffer: 32,
            event_buffer: 100,
            transport_buffer: 256,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `SERVER_TICK_MS`, `CLIENT_FRAME_MS`,
    /// `COMMAND_BUFFER`, `EVENT_BUFFER` and `TRANSPORT_BUFFER`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            server_tick_ms: positive(&lookup, "SERVER_TICK_MS", defaults.server_tick_ms)?,
            client_frame_ms: positive(&lookup, "CLIENT_FRAME_MS", defaults.client_frame_ms)?,
            command_buffer: positive(&lookup, "COMMAND_BUFFER", defaults.command_buffer)?,
            event_buffer: positive(&lookup, "EVENT_BUFFER", defaults.event_buffer)?,
            transport_buffer: positive(&lookup, "TRANSPORT_BUFFER", defaults.transport_buffer)?,
        })
    }
}

fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(RuntimeError::InvalidConfig { key, value: raw }),
    }
}

/// Main runtime that orchestrates a match.
///
/// [`ServerHandle`] and [`ClientHandle`] are cloneable façades over the
/// workers; the runtime itself drives turns through its intent providers.
pub struct Runtime {
    server: ServerHandle,
    clients: Vec<ClientHandle>,
    oracles: OracleBundle,
    providers: BTreeMap<ActorId, Arc<dyn IntentProvider>>,
    default_provider: Option<Arc<dyn IntentProvider>>,

    server_worker: JoinHandle<()>,
    client_workers: Vec<JoinHandle<()>>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn handle(&self) -> ServerHandle {
        self.server.clone()
    }

    pub fn clients(&self) -> &[ClientHandle] {
        &self.clients
    }

    pub fn oracles(&self) -> &OracleBundle {
        &self.oracles
    }

    /// Set the provider for one seat.
    pub fn set_provider(&mut self, actor: ActorId, provider: impl IntentProvider + 'static) {
        self.providers.insert(actor, Arc::new(provider));
    }

    /// Plays out the current actor's turn.
    ///
    /// Asks the seat's provider for intents, submits them and pumps until the
    /// server goes quiet. Returns the actor that held the turn, or `None`
    /// when no turn is open.
    pub async fn step(&mut self) -> Result<Option<ActorId>> {
        let state = self.server.query_state().await?;
        let Some(actor) = state.turn.current_actor else {
            return Ok(None);
        };
        let provider = self
            .providers
            .get(&actor)
            .or(self.default_provider.as_ref())
            .cloned()
            .ok_or(RuntimeError::ProviderNotSet(actor))?;

        let intents = provider.provide_intents(actor, &state, &self.oracles).await?;
        debug!(target: "runtime", %actor, intents = intents.len(), "turn intents provided");
        for intent in intents.into_iter().take(GameConfig::MAX_INTENT_BACKLOG) {
            self.server.submit(intent).await?;
        }
        while self.server.pump_now().await? > 0 {}
        Ok(Some(actor))
    }

    /// Opens the match if needed, then plays turns until one team is left or
    /// `max_turns` have been played. Returns the number of turns played.
    pub async fn run(&mut self, max_turns: u32) -> Result<u32> {
        let state = self.server.query_state().await?;
        if state.turn.current_actor.is_none() {
            self.server.begin_match().await?;
        }

        let mut played = 0;
        while played < max_turns {
            let state = self.server.query_state().await?;
            if is_decided(&state) {
                info!(target: "runtime", turn = state.turn.turn, round = state.turn.round, "match decided");
                break;
            }
            if self.step().await?.is_none() {
                break;
            }
            played += 1;
        }
        Ok(played)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Workers stop on an explicit command, so handle clones held elsewhere
    /// do not keep them alive.
    pub async fn shutdown(self) -> Result<()> {
        self.server.request_shutdown().await;
        for client in &self.clients {
            client.request_shutdown().await;
        }
        drop(self.server);
        drop(self.clients);

        self.server_worker.await.map_err(RuntimeError::WorkerJoin)?;
        for worker in self.client_workers {
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }
        Ok(())
    }
}

/// At most one team still has an undefeated seat with a living unit.
pub fn is_decided(state: &GameState) -> bool {
    let teams: BTreeSet<_> = state
        .actors
        .values()
        .filter(|seat| !seat.defeated)
        .filter(|seat| state.entities.owned_by(seat.id).any(|unit| unit.is_alive()))
        .map(|seat| seat.team)
        .collect();
    teams.len() <= 1
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleBundle>,
    state: Option<GameState>,
    schedule: EventSchedule,
    providers: BTreeMap<ActorId, Arc<dyn IntentProvider>>,
    default_provider: Option<Arc<dyn IntentProvider>>,
    replay_clients: usize,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            state: None,
            schedule: EventSchedule::default(),
            providers: BTreeMap::new(),
            default_provider: None,
            replay_clients: 0,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle bundle
    pub fn oracles(mut self, oracles: OracleBundle) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Provide initial game state
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn schedule(mut self, schedule: EventSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Oracles, opening state and schedule from loaded match content.
    pub fn with_content(self, content: MatchContent) -> Self {
        let schedule = EventSchedule::from_entries(&content.scenario.schedule);
        self.oracles(OracleBundle::from_content(&content))
            .schedule(schedule)
            .initial_state(content.state)
    }

    /// Set the provider for one seat.
    pub fn provider(mut self, actor: ActorId, provider: impl IntentProvider + 'static) -> Self {
        self.providers.insert(actor, Arc::new(provider));
        self
    }

    /// Provider for seats without their own.
    pub fn default_provider(mut self, provider: impl IntentProvider + 'static) -> Self {
        self.default_provider = Some(Arc::new(provider));
        self
    }

    /// Number of replaying clients attached over the in-process transport.
    pub fn replay_clients(mut self, count: usize) -> Self {
        self.replay_clients = count;
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;
        let state = self.state.ok_or(RuntimeError::MissingState)?;
        let config = self.config;

        let event_bus = EventBus::with_capacity(config.event_buffer);
        let transport = ChannelTransport::new(config.transport_buffer);
        let frame = Duration::from_millis(config.client_frame_ms.max(1));

        // Clients subscribe before the server can send anything.
        let mut clients = Vec::with_capacity(self.replay_clients);
        let mut client_workers = Vec::with_capacity(self.replay_clients);
        for index in 0..self.replay_clients {
            let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
            let router = ClientRouter::new(
                state.clone(),
                oracles.clone(),
                TracingPresenter::new(index),
            );
            let worker = ClientWorker::new(
                index,
                router,
                Box::new(transport.subscribe()),
                command_rx,
                event_bus.clone(),
                frame,
            );
            client_workers.push(tokio::spawn(worker.run()));
            clients.push(ClientHandle::new(index, command_tx));
        }

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let router = ServerRouter::new(state, oracles.clone()).with_schedule(self.schedule);
        let server_worker = ServerWorker::new(
            router,
            command_rx,
            event_bus.clone(),
            Arc::new(transport),
            Duration::from_millis(config.server_tick_ms.max(1)),
        );
        let server_worker = tokio::spawn(server_worker.run());

        info!(target: "runtime", clients = clients.len(), "runtime started");
        Ok(Runtime {
            server: ServerHandle::new(command_tx, event_bus),
            clients,
            oracles,
            providers: self.providers,
            default_provider: self.default_provider,
            server_worker,
            client_workers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_defaults() {
        let config = RuntimeConfig::from_lookup(|key| match key {
            "SERVER_TICK_MS" => Some("10".into()),
            "TRANSPORT_BUFFER" => Some(" 8 ".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.server_tick_ms, 10);
        assert_eq!(config.transport_buffer, 8);
        assert_eq!(config.client_frame_ms, RuntimeConfig::default().client_frame_ms);
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        let err = RuntimeConfig::from_lookup(|key| (key == "SERVER_TICK_MS").then(|| "0".into()))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig { key: "SERVER_TICK_MS", .. }));

        let err = RuntimeConfig::from_lookup(|key| (key == "EVENT_BUFFER").then(|| "lots".into()))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig { key: "EVENT_BUFFER", .. }));
    }
}
