// src/observability/mod.rs
//! Logging setup
//!
//! Log levels come from `DOM_TRACKER_LOG` using `EnvFilter` syntax, e.g.
//! `DOM_TRACKER_LOG=dom_tracker=debug`. Set `DOM_TRACKER_LOG_FORMAT=json`
//! for machine-readable output. Counters are emitted through the `metrics`
//! facade and are no-ops until the host installs a recorder.

use crate::utils::errors::{Result, TrackerError};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter variable
pub const LOG_ENV: &str = "DOM_TRACKER_LOG";

/// Output format variable ("json" or anything else for plain text)
pub const LOG_FORMAT_ENV: &str = "DOM_TRACKER_LOG_FORMAT";

const DEFAULT_FILTER: &str = "dom_tracker=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_tracing() -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| TrackerError::ConfigError(format!("Failed to initialize tracing: {}", e)))?;
    let _ = INIT.set(());
    Ok(())
}
