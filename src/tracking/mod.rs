// src/tracking/mod.rs
//! DOM event capture and batching
//!
//! - **Element**: target abstraction and editability check
//! - **Event**: trackability rules and property projection
//! - **Sanitize**: per-property length caps
//! - **Batch Queue**: accumulation, heartbeat flushes, unload handling
//! - **Registry**: one collector per document context
//!
//! # Architecture
//!
//! ```text
//! Host event → observe() → EventRecord → add_event()
//!                                          │
//!                         ┌────────────────┴───────────────┐
//!                   queue (click, keyup, ...)      triggered (scroll)
//!                    append in order                latest per type
//!                         └────────────────┬───────────────┘
//!                                          ↓
//!                     heartbeat (3s) / unload → flush
//!                                          ↓
//!                        trackable? → sanitize → Batch
//!                                          ↓
//!                                    DeliverySink
//! ```

pub mod batch_queue;
pub mod element;
pub mod event;
pub mod registry;
pub mod sanitize;

// Re-export commonly used types
pub use batch_queue::{BatchQueue, QueueStats};
pub use element::{is_editable, ClassName, Element, ElementNode, ElementSnapshot};
pub use event::{EventProperties, EventRecord, RawEvent, RawEventSpec, TrackingRecord};
pub use registry::TrackerRegistry;
pub use sanitize::{sanitize, Prop, MAX_PROP_LENGTH, MAX_TEXT_LENGTH};
