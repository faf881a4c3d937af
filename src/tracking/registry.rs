// src/tracking/registry.rs
//! Collector registry
//!
//! Guarantees a single active collector per document context. Callers own
//! the registry and name the context explicitly.

use crate::delivery::DeliverySink;
use crate::tracking::batch_queue::BatchQueue;
use crate::utils::config::TrackerConfig;
use crate::utils::errors::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of collectors keyed by document context
pub struct TrackerRegistry {
    config: TrackerConfig,
    sink: Arc<dyn DeliverySink>,
    trackers: Mutex<HashMap<String, Arc<BatchQueue>>>,
}

impl TrackerRegistry {
    /// Create a registry whose collectors share `config` and `sink`
    pub fn new(config: TrackerConfig, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            config,
            sink,
            trackers: Mutex::new(HashMap::new()),
        }
    }

    /// Return the collector for `context`, creating and activating it if needed.
    ///
    /// The flag is true when a new collector was created.
    pub fn attach(&self, context: &str) -> Result<(Arc<BatchQueue>, bool)> {
        let mut trackers = self.trackers.lock();

        if let Some(existing) = trackers.get(context) {
            debug!("Collector already attached to {}", context);
            return Ok((Arc::clone(existing), false));
        }

        let tracker = Arc::new(BatchQueue::new(self.config.clone(), Arc::clone(&self.sink)));
        tracker.activate()?;
        trackers.insert(context.to_string(), Arc::clone(&tracker));

        info!("Attached collector to {}", context);
        Ok((tracker, true))
    }

    pub fn get(&self, context: &str) -> Option<Arc<BatchQueue>> {
        self.trackers.lock().get(context).cloned()
    }

    /// Unload and forget the collector for `context`
    pub fn detach(&self, context: &str) -> bool {
        let removed = self.trackers.lock().remove(context);
        match removed {
            Some(tracker) => {
                tracker.unload();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.trackers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.lock().is_empty()
    }
}
