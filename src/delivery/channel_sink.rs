// src/delivery/channel_sink.rs
//! Channel-backed delivery
//!
//! Hands batches to a transport task through an unbounded tokio channel, the
//! same way the page-level command queue hands `trackRaw` calls to the
//! tracking library.

use crate::delivery::{Batch, Completion, DeliveryOutcome, DeliverySink};
use tokio::sync::mpsc;
use tracing::warn;

/// A batch waiting for the transport
#[derive(Debug)]
pub struct Delivery {
    pub batch: Batch,

    /// Must be completed by the transport once the request settles
    pub completion: Completion,
}

/// Sink forwarding deliveries over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl ChannelSink {
    /// Create a sink and the receiver the transport drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DeliverySink for ChannelSink {
    fn deliver(&self, batch: Batch, completion: Completion) {
        if let Err(mpsc::error::SendError(delivery)) = self.tx.send(Delivery { batch, completion }) {
            warn!(
                "Transport channel closed, dropping batch {} ({} records)",
                delivery.batch.sequence,
                delivery.batch.len()
            );
            delivery
                .completion
                .complete(DeliveryOutcome::Failed("transport channel closed".to_string()));
        }
    }
}
