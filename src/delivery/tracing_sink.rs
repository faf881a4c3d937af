// src/delivery/tracing_sink.rs
//! Log-only delivery, used by the replay binary and for local debugging

use crate::delivery::{Batch, Completion, DeliveryOutcome, DeliverySink};
use crate::utils::errors::TrackerError;
use tracing::{error, info};

/// Sink that writes each batch as JSON to the log
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl DeliverySink for TracingSink {
    fn deliver(&self, batch: Batch, completion: Completion) {
        match serde_json::to_string(&batch.records) {
            Ok(json) => {
                info!(
                    target: "dom_tracker::delivery",
                    sequence = batch.sequence,
                    records = batch.len(),
                    "{}",
                    json
                );
                completion.complete(DeliveryOutcome::Delivered);
            }
            Err(e) => {
                let err = TrackerError::from(e);
                error!("Batch {} not logged: {}", batch.sequence, err);
                completion.complete(DeliveryOutcome::Failed(err.to_string()));
            }
        }
    }
}
