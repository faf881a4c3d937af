// src/tracking/batch_queue.rs
//! Event queue and delivery manager
//!
//! Accumulates event records between heartbeats and hands every trackable
//! record to the delivery sink in one batch per flush.
//!
//! Discrete interactions (click, keyup, ...) are appended in order.
//! High-frequency types (scroll) keep a single slot holding the latest
//! occurrence. Trackability is checked at flush time, so an element that
//! opts out after its event was queued is still excluded.

use crate::delivery::{Batch, Completion, DeliveryOutcome, DeliverySink};
use crate::tracking::event::{EventRecord, RawEvent, TrackingRecord};
use crate::utils::config::TrackerConfig;
use crate::utils::errors::{Result, TrackerError};
use parking_lot::{Condvar, Mutex};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

/// In-flight delivery that `unload` may wait for
#[derive(Debug, Clone, Copy)]
struct PendingDelivery {
    sequence: u64,
    until: Instant,
}

#[derive(Default)]
struct QueueState {
    queue: Vec<EventRecord>,

    /// Latest record per high-frequency type, in first-seen order
    triggered: Vec<(String, EventRecord)>,

    is_active: bool,
    pending_unload: Option<PendingDelivery>,
    heartbeat: Option<JoinHandle<()>>,
    sequence: u64,
    counters: Counters,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    events_added: u64,
    batches_dispatched: u64,
    records_dispatched: u64,
    records_dropped: u64,
    deliveries_succeeded: u64,
    deliveries_failed: u64,
}

struct Inner {
    config: TrackerConfig,
    sink: Arc<dyn DeliverySink>,
    state: Mutex<QueueState>,
    delivery_settled: Condvar,
}

/// Batching engine for DOM interaction events
pub struct BatchQueue {
    inner: Arc<Inner>,
}

impl BatchQueue {
    /// Create an inactive queue delivering to `sink`
    pub fn new(config: TrackerConfig, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                sink,
                state: Mutex::new(QueueState::default()),
                delivery_settled: Condvar::new(),
            }),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    /// Start the heartbeat.
    ///
    /// The first heartbeat flushes immediately, then every
    /// `flush_interval_ms`. Calling again replaces the running heartbeat.
    /// Must be called from within a tokio runtime.
    pub fn activate(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TrackerError::RuntimeUnavailable(e.to_string()))?;

        let period = self.inner.config.flush_interval();
        if period.is_zero() {
            return Err(TrackerError::ConfigError(
                "flush_interval_ms must be greater than 0".to_string(),
            ));
        }
        let weak = Arc::downgrade(&self.inner);

        let mut state = self.inner.state.lock();
        state.is_active = true;
        if let Some(previous) = state.heartbeat.take() {
            debug!("Replacing running heartbeat");
            previous.abort();
        }
        state.heartbeat = Some(runtime.spawn(heartbeat_loop(weak, period)));

        info!("DOM tracker activated (flush every {:?})", period);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().is_active
    }

    /// Queue a record for the next flush
    pub fn add_event(&self, record: EventRecord) {
        let trigger_type = record
            .event_type()
            .filter(|t| self.inner.config.is_trigger_event(t))
            .map(str::to_owned);

        let mut state = self.inner.state.lock();
        state.counters.events_added += 1;

        match trigger_type {
            Some(event_type) => {
                trace!("Collapsing {} event", event_type);
                match state.triggered.iter().position(|(t, _)| *t == event_type) {
                    Some(idx) => state.triggered[idx].1 = record,
                    None => state.triggered.push((event_type, record)),
                }
            }
            None => state.queue.push(record),
        }

        metrics::counter!("dom_tracker_events_added_total").increment(1);
    }

    /// Wrap and queue a raw event if its type is subscribed
    pub fn observe(&self, raw: RawEvent) {
        match raw.event_type.as_deref() {
            Some(t) if self.inner.config.is_subscribed(t) => {
                self.add_event(EventRecord::new(raw));
            }
            other => trace!("Ignoring unsubscribed event type {:?}", other),
        }
    }

    /// Flush queued records; no-op while inactive
    pub fn flush(&self) {
        if !self.is_active() {
            return;
        }
        self.inner.flush_and_reset();
    }

    /// Flush immediately and wait for the delivery to settle.
    ///
    /// Blocks the calling thread until the delivery completes or the
    /// `unload_grace_ms` window elapses, whichever comes first.
    pub fn unload(&self) {
        info!("Unloading DOM tracker");
        self.inner.flush_and_reset();

        let mut state = self.inner.state.lock();
        while let Some(pending) = state.pending_unload {
            let result = self.inner.delivery_settled.wait_until(&mut state, pending.until);
            if result.timed_out() {
                debug!("Unload grace window elapsed for batch {}", pending.sequence);
                break;
            }
        }
    }

    /// Snapshot of queue state and lifetime counters
    pub fn stats(&self) -> QueueStats {
        let state = self.inner.state.lock();
        let c = state.counters;

        QueueStats {
            is_active: state.is_active,
            queued: state.queue.len(),
            triggered: state.triggered.len(),
            delivery_pending: state.pending_unload.is_some(),
            events_added: c.events_added,
            batches_dispatched: c.batches_dispatched,
            records_dispatched: c.records_dispatched,
            records_dropped: c.records_dropped,
            deliveries_succeeded: c.deliveries_succeeded,
            deliveries_failed: c.deliveries_failed,
        }
    }
}

async fn heartbeat_loop(inner: Weak<Inner>, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let Some(inner) = inner.upgrade() else {
            break;
        };
        if !inner.state.lock().is_active {
            break;
        }
        inner.flush_and_reset();
    }
}

impl Inner {
    /// Build and dispatch a batch, then clear all pending records
    fn flush_and_reset(self: &Arc<Self>) {
        let batch = {
            let mut state = self.state.lock();
            let queued = std::mem::take(&mut state.queue);
            let triggered = std::mem::take(&mut state.triggered);

            let mut records = Vec::with_capacity(queued.len() + triggered.len());
            let mut dropped = 0u64;

            for event in queued.iter() {
                match self.tracking_record(event) {
                    Some(record) => {
                        debug!("DOM tracker queued {:?}", record);
                        records.push(record);
                    }
                    None => dropped += 1,
                }
            }
            for (_, event) in triggered.iter() {
                match self.tracking_record(event) {
                    Some(record) => {
                        debug!("DOM tracker triggered {:?}", record);
                        records.push(record);
                    }
                    None => dropped += 1,
                }
            }

            state.counters.records_dropped += dropped;
            metrics::counter!("dom_tracker_records_dropped_total").increment(dropped);

            if records.is_empty() {
                return;
            }

            state.sequence += 1;
            let sequence = state.sequence;
            state.pending_unload = Some(PendingDelivery {
                sequence,
                until: Instant::now() + self.config.unload_grace(),
            });
            state.counters.batches_dispatched += 1;
            state.counters.records_dispatched += records.len() as u64;

            Batch {
                sequence,
                created_at: chrono::Utc::now(),
                records,
            }
        };

        let sequence = batch.sequence;
        debug!("Dispatching batch {} ({} records)", sequence, batch.len());
        metrics::counter!("dom_tracker_records_dispatched_total").increment(batch.len() as u64);

        let weak = Arc::downgrade(self);
        let completion = Completion::new(move |outcome| {
            if let Some(inner) = weak.upgrade() {
                inner.settle(sequence, outcome);
            }
        });

        self.sink.deliver(batch, completion);
    }

    fn tracking_record(&self, event: &EventRecord) -> Option<TrackingRecord> {
        event
            .is_trackable_with(&self.config.ignore_attribute)
            .then(|| event.to_tracking_record(&self.config.event_name))
    }

    /// Record a delivery outcome and release a waiting `unload`
    fn settle(&self, sequence: u64, outcome: DeliveryOutcome) {
        let mut state = self.state.lock();

        match outcome {
            DeliveryOutcome::Delivered => {
                debug!("DOM tracker batch {} delivered", sequence);
                state.counters.deliveries_succeeded += 1;
            }
            DeliveryOutcome::Failed(reason) => {
                warn!("DOM tracker batch {} failed: {}", sequence, reason);
                state.counters.deliveries_failed += 1;
                metrics::counter!("dom_tracker_deliveries_failed_total").increment(1);
            }
        }

        if state.pending_unload.is_some_and(|p| p.sequence == sequence) {
            state.pending_unload = None;
        }
        drop(state);

        self.delivery_settled.notify_all();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(heartbeat) = self.state.get_mut().heartbeat.take() {
            heartbeat.abort();
        }
    }
}

/// Queue statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    pub is_active: bool,

    /// Records waiting in the ordered queue
    pub queued: usize,

    /// Collapsed high-frequency records waiting
    pub triggered: usize,

    /// Whether a delivery is still expected to settle
    pub delivery_pending: bool,

    pub events_added: u64,
    pub batches_dispatched: u64,
    pub records_dispatched: u64,

    /// Records discarded as untrackable at flush time
    pub records_dropped: u64,

    pub deliveries_succeeded: u64,
    pub deliveries_failed: u64,
}

impl QueueStats {
    /// Records not yet flushed
    pub fn pending(&self) -> usize {
        self.queued + self.triggered
    }
}
