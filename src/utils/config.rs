// src/utils/config.rs
//! Capture engine configuration
//!
//! Layered loading: an optional `config/capture.*` file, overridden by
//! `CAPTURE_*` environment variables (nested keys separated by `__`, e.g.
//! `CAPTURE_CAPTURE__LOG_DIR`). Every deployment-specific knob lives here;
//! nothing in the pipeline hardcodes paths or MIME lists.

use crate::sanitize::SanitizePolicy;
use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Capture session storage settings
    pub capture: CaptureSettings,

    /// External interception engine settings
    pub engine: EngineSettings,

    /// Payload sanitization policy
    pub sanitize: SanitizePolicy,

    /// Event relay settings
    pub events: EventSettings,
}

/// Where capture sessions live and how they are named
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Directory holding session log files
    pub log_dir: PathBuf,

    /// Session filename used when the caller does not supply one
    pub default_file: String,

    /// Session file extension (without the dot)
    pub file_extension: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("data/logs/raw-json"),
            default_file: "box-traffic-logs.json".to_string(),
            file_extension: "json".to_string(),
        }
    }
}

/// How to launch the external interception engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine executable, resolved through PATH
    pub command: String,

    /// Arguments passed to the engine
    pub args: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            command: "anyproxy".to_string(),
            args: vec![
                "--port".to_string(),
                "8001".to_string(),
                "--rule".to_string(),
                "anyproxy/rule.js".to_string(),
                "--intercept".to_string(),
            ],
        }
    }
}

/// Relayed-event buffering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Most-recent-N ring buffer capacity for relayed engine events
    pub buffer_capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
        }
    }
}

impl CaptureConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/capture").required(false))
            .add_source(
                config::Environment::with_prefix("CAPTURE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::BinaryPolicy;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.capture.default_file, "box-traffic-logs.json");
        assert_eq!(config.capture.file_extension, "json");
        assert_eq!(config.engine.command, "anyproxy");
        assert_eq!(config.events.buffer_capacity, 1000);
        assert_eq!(config.sanitize.binary_policy, BinaryPolicy::Structured);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = CaptureConfig::load().unwrap();
        assert_eq!(config.capture.file_extension, "json");
        assert!(!config.sanitize.drop_prefixes.is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CaptureConfig =
            serde_json::from_str(r#"{"engine":{"command":"mockproxy"}}"#).unwrap();
        assert_eq!(config.engine.command, "mockproxy");
        assert_eq!(config.engine.args, EngineSettings::default().args);
        assert_eq!(config.capture.default_file, "box-traffic-logs.json");
    }
}
