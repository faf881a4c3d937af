// src/utils/config.rs
//! Tracker configuration
//!
//! Defaults match the collector's fixed constants. Values can be layered from
//! an optional file (path in `DOM_TRACKER_CONFIG`) and `DOM_TRACKER__*`
//! environment variables, e.g. `DOM_TRACKER__FLUSH_INTERVAL_MS=5000`.

use crate::utils::errors::{Result, TrackerError};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming an optional configuration file
pub const CONFIG_PATH_ENV: &str = "DOM_TRACKER_CONFIG";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "DOM_TRACKER";

/// Collector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Heartbeat period between flushes (milliseconds)
    pub flush_interval_ms: u64,

    /// Grace window `unload` waits for an in-flight delivery (milliseconds)
    pub unload_grace_ms: u64,

    /// Event types recorded on every occurrence
    pub queue_events: Vec<String>,

    /// High-frequency event types collapsed to their latest occurrence
    pub trigger_events: Vec<String>,

    /// Attribute that opts an element out of tracking
    pub ignore_attribute: String,

    /// Marker written to `event_name` on every record
    pub event_name: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 3000,
            unload_grace_ms: 300,
            queue_events: ["click", "keyup", "change", "focus", "submit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trigger_events: vec!["scroll".to_string()],
            ignore_attribute: "data-bd-ignore".to_string(),
            event_name: "$dom_event".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from defaults, `DOM_TRACKER_CONFIG` and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref().map(Path::new))
    }

    /// Load configuration layering an explicit file over the defaults
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Loading tracker configuration from {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("queue_events")
                    .with_list_parse_key("trigger_events"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.flush_interval_ms == 0 {
            return Err(TrackerError::ConfigError(
                "flush_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.unload_grace_ms == 0 {
            return Err(TrackerError::ConfigError(
                "unload_grace_ms must be greater than 0".to_string(),
            ));
        }
        if self.event_name.is_empty() {
            return Err(TrackerError::ConfigError("event_name cannot be empty".to_string()));
        }
        if self.ignore_attribute.is_empty() {
            return Err(TrackerError::ConfigError(
                "ignore_attribute cannot be empty".to_string(),
            ));
        }
        if let Some(overlap) = self
            .trigger_events
            .iter()
            .find(|t| self.queue_events.contains(t))
        {
            return Err(TrackerError::ConfigError(format!(
                "event type '{}' cannot be both queued and triggered",
                overlap
            )));
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn unload_grace(&self) -> Duration {
        Duration::from_millis(self.unload_grace_ms)
    }

    /// Whether `event_type` collapses to its latest occurrence
    pub fn is_trigger_event(&self, event_type: &str) -> bool {
        self.trigger_events.iter().any(|t| t == event_type)
    }

    /// Whether the host should forward events of this type
    pub fn is_subscribed(&self, event_type: &str) -> bool {
        self.is_trigger_event(event_type) || self.queue_events.iter().any(|t| t == event_type)
    }

    /// All event types the host should subscribe to
    pub fn subscribed_events(&self) -> Vec<&str> {
        self.queue_events
            .iter()
            .chain(self.trigger_events.iter())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Loading reads process-wide environment variables
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.flush_interval(), Duration::from_millis(3000));
        assert_eq!(config.unload_grace(), Duration::from_millis(300));
        assert_eq!(config.event_name, "$dom_event");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_subscribed_events() {
        let config = TrackerConfig::default();
        assert_eq!(
            config.subscribed_events(),
            vec!["click", "keyup", "change", "focus", "submit", "scroll"]
        );
        assert!(config.is_trigger_event("scroll"));
        assert!(!config.is_trigger_event("click"));
        assert!(config.is_subscribed("submit"));
        assert!(!config.is_subscribed("mousemove"));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let config = TrackerConfig {
            trigger_events: vec!["click".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TrackerError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = TrackerConfig {
            flush_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let _env = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "flush_interval_ms = 5000").unwrap();
        writeln!(file, "trigger_events = [\"scroll\", \"resize\"]").unwrap();
        drop(file);

        let config = TrackerConfig::load_from(Some(path.as_path())).unwrap();
        assert_eq!(config.flush_interval_ms, 5000);
        assert_eq!(config.unload_grace_ms, 300);
        assert!(config.is_trigger_event("resize"));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let _env = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(TrackerConfig::load_from(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let _env = ENV_LOCK.lock();
        std::env::set_var("DOM_TRACKER__FLUSH_INTERVAL_MS", "5000");
        std::env::set_var("DOM_TRACKER__TRIGGER_EVENTS", "scroll,resize");

        let loaded = TrackerConfig::load_from(None);

        std::env::remove_var("DOM_TRACKER__FLUSH_INTERVAL_MS");
        std::env::remove_var("DOM_TRACKER__TRIGGER_EVENTS");

        let config = loaded.unwrap();
        assert_eq!(config.flush_interval_ms, 5000);
        assert_eq!(config.trigger_events, vec!["scroll", "resize"]);
        assert_eq!(config.unload_grace_ms, 300);
        assert!(config.is_subscribed("resize"));
    }
}
