//! Runtime orchestration for the deterministic action pipeline.
//!
//! This crate wires the `game-core` rules into an authoritative server, any
//! number of replaying clients and the transport between them. Consumers
//! embed [`Runtime`] to drive turns, subscribe to events, and inspect either
//! side through [`ServerHandle`] and [`ClientHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`router`] holds the synchronous server and client routers
//! - [`transport`] carries tick batches from server to clients
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`presentation`] renders replay cues as structured logs
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod presentation;
pub mod router;
pub mod runtime;
pub mod transport;

mod workers;

pub use api::{
    ClientHandle, EndTurnProvider, IntentProvider, Result, RuntimeError, ServerHandle,
    SkirmishProvider,
};
pub use events::{Event, EventBus, MatchEvent, ReplayEvent, Topic, TurnEvent};
pub use oracle::OracleBundle;
pub use presentation::TracingPresenter;
pub use router::{
    ClientRouter, Desync, EventSchedule, PredictError, ReplayError, ServerRouter, SubmitError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, is_decided};
pub use transport::{
    BatchSink, BatchSource, ChannelReceiver, ChannelTransport, TickBatch, TransportError,
};
