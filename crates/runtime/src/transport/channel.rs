//! In-process transport over a tokio broadcast channel.
//!
//! Batches travel as encoded JSON so the in-process path exercises the same
//! codec a network transport would.
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::trace;

use super::{BatchSink, BatchSource, TickBatch, TransportError};

#[derive(Clone, Debug)]
pub struct ChannelTransport {
    tx: broadcast::Sender<Arc<str>>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    /// Attaches a new client. It receives batches sent from now on.
    pub fn subscribe(&self) -> ChannelReceiver {
        ChannelReceiver {
            rx: self.tx.subscribe(),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl BatchSink for ChannelTransport {
    async fn send(&self, batch: &TickBatch) -> Result<(), TransportError> {
        let payload: Arc<str> = batch.encode()?.into();
        if self.tx.send(payload).is_err() {
            trace!(target: "runtime::transport", "no clients attached; batch discarded");
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ChannelReceiver {
    rx: broadcast::Receiver<Arc<str>>,
}

#[async_trait]
impl BatchSource for ChannelReceiver {
    async fn recv(&mut self) -> Result<TickBatch, TransportError> {
        match self.rx.recv().await {
            Ok(payload) => TickBatch::decode(&payload),
            Err(RecvError::Lagged(missed)) => Err(TransportError::Lagged(missed)),
            Err(RecvError::Closed) => Err(TransportError::Closed),
        }
    }

    fn try_recv(&mut self) -> Result<Option<TickBatch>, TransportError> {
        match self.rx.try_recv() {
            Ok(payload) => TickBatch::decode(&payload).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Lagged(missed)) => Err(TransportError::Lagged(missed)),
            Err(TryRecvError::Closed) => Err(TransportError::Closed),
        }
    }
}
