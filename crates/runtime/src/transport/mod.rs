//! Server → client replication.
//!
//! The server sends one [`TickBatch`] per tick in which anything happened.
//! Batches are JSON encoded as `{ "plans": [{type, data}], "events": [id] }`
//! and applied by clients atomically and in order.
mod channel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use game_core::{EventId, PlanRecord};

pub use channel::{ChannelReceiver, ChannelTransport};

/// Plans committed during one server tick plus the world events they fired,
/// both in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickBatch {
    pub plans: Vec<PlanRecord>,
    #[serde(default)]
    pub events: Vec<EventId>,
}

impl TickBatch {
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty() && self.events.is_empty()
    }

    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(TransportError::Encode)
    }

    pub fn decode(payload: &str) -> Result<Self, TransportError> {
        serde_json::from_str(payload).map_err(TransportError::Decode)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode batch")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode batch")]
    Decode(#[source] serde_json::Error),

    /// The receiver fell behind and batches were discarded.
    #[error("receiver lagged behind by {0} batches")]
    Lagged(u64),

    #[error("transport closed")]
    Closed,
}

/// Outbound half used by the server.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn send(&self, batch: &TickBatch) -> Result<(), TransportError>;
}

/// Inbound half used by a replaying client.
#[async_trait]
pub trait BatchSource: Send {
    /// Waits for the next batch.
    async fn recv(&mut self) -> Result<TickBatch, TransportError>;

    /// Returns a batch that has already arrived, if any.
    fn try_recv(&mut self) -> Result<Option<TickBatch>, TransportError>;
}
