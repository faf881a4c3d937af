// src/lib.rs
//! DOM Tracker Library
//!
//! Captures user-interface events from a running document, reduces them to
//! bounded, sanitized tracking records and delivers them in periodic batches.
//!
//! # Architecture
//!
//! - **tracking**: event classification, sanitization, batching, registry
//! - **delivery**: sink trait, completion handles, bundled sinks
//! - **observability**: tracing setup
//! - **utils**: configuration and errors
//!
//! # Example
//!
//! ```no_run
//! use dom_tracker::{ElementNode, RawEvent, TrackerConfig, TrackerRegistry, TracingSink};
//! use std::sync::Arc;
//!
//! # async fn run() -> dom_tracker::Result<()> {
//! let registry = TrackerRegistry::new(TrackerConfig::load()?, Arc::new(TracingSink::new()));
//! let (tracker, _) = registry.attach("main-document")?;
//!
//! let button = Arc::new(ElementNode::new("BUTTON").with_id("go").with_text("Go"));
//! tracker.observe(RawEvent::new("click", button).with_which(1));
//!
//! // Before the document goes away; unload blocks for up to the grace window
//! let unloading = Arc::clone(&tracker);
//! tokio::task::spawn_blocking(move || unloading.unload())
//!     .await
//!     .expect("unload task panicked");
//! # Ok(())
//! # }
//! ```

// Public module exports
pub mod delivery;
pub mod observability;
pub mod tracking;
pub mod utils;

// Re-export commonly used types
pub use delivery::{
    Batch, ChannelSink, Completion, Delivery, DeliveryOutcome, DeliverySink, TracingSink,
};
pub use tracking::{
    BatchQueue, Element, ElementNode, EventRecord, QueueStats, RawEvent, TrackerRegistry,
    TrackingRecord,
};
pub use utils::config::TrackerConfig;
pub use utils::errors::{Result, TrackerError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
