// src/utils/errors.rs
//! Error types for the tracker
//!
//! Capture, classification and sanitization are total and never fail. These
//! errors cover the surfaces around them: configuration, runtime wiring and
//! batch serialization.

use thiserror::Error;

/// Tracker errors
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No async runtime available to drive the flush timer
    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// A batch could not be serialized
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

impl From<::config::ConfigError> for TrackerError {
    fn from(e: ::config::ConfigError) -> Self {
        TrackerError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::SerializationFailed(e.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::ConfigError("flush_interval_ms must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: flush_interval_ms must be > 0"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: TrackerError = parse.unwrap_err().into();
        assert!(matches!(err, TrackerError::SerializationFailed(_)));
        // Sinks forward this text as the failed delivery reason
        assert!(err.to_string().starts_with("Serialization failed: "));
    }
}
