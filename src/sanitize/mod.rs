// src/sanitize/mod.rs
//! Payload sanitization
//!
//! Pure decision and transform layer for intercepted payloads:
//!
//! - **Classifier**: content-type drop list and binary/encoded probes
//! - **Body**: normalization and redaction ahead of persistence
//!
//! Two binary-detection policies exist (`generic` and `structured`); they
//! are selected by configuration and never merged.

pub mod body;
pub mod classifier;

// Re-export commonly used types
pub use body::sanitize;
pub use classifier::{looks_binary_or_encoded, should_drop_body, BinaryPolicy};

use serde::{Deserialize, Serialize};

/// Sanitization policy: the externally-configurable knobs of this layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizePolicy {
    /// MIME prefixes whose bodies are dropped outright
    pub drop_prefixes: Vec<String>,

    /// Binary-detection strategy for bodies that survive the drop list
    pub binary_policy: BinaryPolicy,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            drop_prefixes: vec![
                "image/".to_string(),
                "application/octet-stream".to_string(),
                "text/html".to_string(),
                "text/css".to_string(),
                "application/javascript".to_string(),
                "application/x-javascript".to_string(),
                "text/javascript".to_string(),
                "application/x-protobuf".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ],
            binary_policy: BinaryPolicy::Structured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = SanitizePolicy::default();
        assert!(policy.drop_prefixes.contains(&"image/".to_string()));
        assert_eq!(policy.binary_policy, BinaryPolicy::Structured);
    }

    #[test]
    fn test_policy_deserializes_from_config_shape() {
        let policy: SanitizePolicy = serde_json::from_str(
            r#"{"drop_prefixes":["image/"],"binary_policy":"generic"}"#,
        )
        .unwrap();
        assert_eq!(policy.drop_prefixes, vec!["image/".to_string()]);
        assert_eq!(policy.binary_policy, BinaryPolicy::Generic);
    }
}
