// src/delivery/mod.rs
//! Batch delivery
//!
//! The tracker hands every non-empty batch to a [`DeliverySink`] together with
//! a [`Completion`]. The sink owns the transport; the tracker only learns
//! whether the hand-off eventually succeeded.
//!
//! - **ChannelSink**: forwards batches to a transport task over a channel
//! - **TracingSink**: writes batches to the log and reports success

pub mod channel_sink;
pub mod tracing_sink;

use crate::tracking::event::TrackingRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use channel_sink::{ChannelSink, Delivery};
pub use tracing_sink::TracingSink;

/// Ordered batch of tracking records produced by one flush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Flush sequence number, starting at 1 per queue
    pub sequence: u64,

    /// When the batch was assembled
    pub created_at: DateTime<Utc>,

    /// Records in queue order, collapsed records last
    pub records: Vec<TrackingRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

impl DeliveryOutcome {
    /// Interpret an ingestion endpoint response.
    ///
    /// The endpoint acknowledges with either the number `1` or an object whose
    /// `status` is `"ok"`.
    pub fn from_response(response: &serde_json::Value) -> Self {
        let ok = response.as_u64() == Some(1)
            || response.get("status").and_then(|s| s.as_str()) == Some("ok");

        if ok {
            DeliveryOutcome::Delivered
        } else {
            DeliveryOutcome::Failed(format!("unexpected response: {}", response))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

type CompletionFn = Box<dyn FnOnce(DeliveryOutcome) + Send + 'static>;

/// Callback fired exactly once when a delivery finishes.
///
/// Dropping an unfired completion reports a failure, so the tracker never
/// waits on a batch the transport silently discarded.
pub struct Completion {
    callback: Option<CompletionFn>,
}

impl Completion {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(DeliveryOutcome) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// A completion that ignores the outcome
    pub fn noop() -> Self {
        Self { callback: None }
    }

    pub fn complete(mut self, outcome: DeliveryOutcome) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(DeliveryOutcome::Failed("completion dropped".to_string()));
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// Transport for tracking batches. Implementations must not block.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, batch: Batch, completion: Completion);
}
