// src/supervisor/mod.rs
//! Interception engine supervision
//!
//! - **Supervisor**: the four-operation lifecycle state machine around the
//!   single external engine process
//! - **Events**: stdout envelope parsing and the bounded relay buffer
//!
//! The control surface exposed here is transport-agnostic: the dashboard
//! collaborator gets serializable `{status, message}` replies and a status
//! snapshot, nothing HTTP-specific.

pub mod events;
#[allow(clippy::module_inception)]
pub mod supervisor;

// Re-export commonly used types
pub use events::{parse_event_line, EngineEvent, EventBuffer};
pub use supervisor::{EngineSupervisor, SupervisorConfig, SupervisorState, SupervisorStatus};

use crate::utils::errors::Result;
use serde::Serialize;

/// Reply shape for the start/stop control operations
#[derive(Debug, Clone, Serialize)]
pub struct ControlResponse {
    pub status: &'static str,
    pub message: String,
}

impl ControlResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

impl EngineSupervisor {
    /// `start` wrapped in the dashboard reply shape.
    pub async fn start_reply(&self, filename: &str) -> ControlResponse {
        match self.start(filename).await {
            Ok(()) => ControlResponse::success(format!(
                "interception engine started, logging to {filename}"
            )),
            Err(e) => ControlResponse::error(e.to_string()),
        }
    }

    /// `stop` wrapped in the dashboard reply shape.
    pub async fn stop_reply(&self) -> ControlResponse {
        match self.stop().await {
            Ok(()) => ControlResponse::success("interception engine stopped"),
            Err(e) => ControlResponse::error(e.to_string()),
        }
    }
}

/// Convenience alias matching the logical control contract: `status()`
/// already returns the serializable snapshot.
pub fn status_reply(status: &SupervisorStatus) -> Result<serde_json::Value> {
    serde_json::to_value(status).map_err(|e| {
        crate::utils::errors::CaptureError::Runtime(format!("status serialization failed: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_response_shapes() {
        let ok = ControlResponse::success("started");
        assert_eq!(ok.status, "success");

        let err = ControlResponse::error("already running");
        assert_eq!(err.status, "error");
        assert_eq!(err.message, "already running");
    }

    #[test]
    fn test_status_reply_serialization() {
        let status = SupervisorStatus {
            state: SupervisorState::Running,
            is_running: true,
            current_file: Some("box-traffic-logs.json".to_string()),
        };
        let value = status_reply(&status).unwrap();
        assert_eq!(value["state"], "running");
        assert_eq!(value["isRunning"], true);
        assert_eq!(value["currentFile"], "box-traffic-logs.json");
    }
}
