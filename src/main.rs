// src/main.rs
//! DOM Tracker replay tool
//!
//! Reads newline-delimited JSON raw events from stdin, runs them through a
//! collector and logs each delivered batch. Teardown happens at end of input.
//!
//! ```text
//! {"type": "click", "which": 1, "target": {"tag_name": "BUTTON", "id": "go"}}
//! ```

use anyhow::{Context, Result};
use dom_tracker::observability::init_tracing;
use dom_tracker::tracking::RawEventSpec;
use dom_tracker::{RawEvent, TrackerConfig, TrackerRegistry, TracingSink};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const CONTEXT: &str = "replay";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting DOM tracker replay v{}", dom_tracker::VERSION);

    let config = TrackerConfig::load().context("Failed to load tracker configuration")?;
    info!("Configuration loaded: {:?}", config);

    let registry = TrackerRegistry::new(config, Arc::new(TracingSink::new()));
    let (tracker, _) = registry.attach(CONTEXT)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RawEventSpec>(&line) {
            Ok(spec) => tracker.observe(RawEvent::from(spec)),
            Err(e) => warn!("Skipping line {}: {}", line_no, e),
        }
    }

    info!("End of input after {} lines, unloading", line_no);
    let unloading = Arc::clone(&tracker);
    tokio::task::spawn_blocking(move || unloading.unload()).await?;

    let stats = tracker.stats();
    info!(
        "Dispatched {} records in {} batches ({} dropped)",
        stats.records_dispatched, stats.batches_dispatched, stats.records_dropped
    );

    Ok(())
}
