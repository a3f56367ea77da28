// src/interception/hooks.rs
//! Interception hook façade
//!
//! This is the code that runs inside the engine for every observed
//! exchange: build a record from the raw hook arguments, append it to the
//! session file, and emit the structured stdout envelope the supervisor
//! relays. Hooks may fire concurrently for different in-flight exchanges;
//! the writer serializes the actual appends.
//!
//! Append failures degrade logging but never break capture: they are
//! logged and swallowed so the engine keeps intercepting.

use crate::interception::record::{
    build_request_record, build_response_record, LogRecord, RequestDetail, ResponseDetail,
};
use crate::recording::writer::SessionWriter;
use crate::sanitize::SanitizePolicy;
use crate::supervisor::events::EngineEvent;
use tracing::warn;

/// Hook callbacks wired to one capture session
pub struct CaptureHooks {
    policy: SanitizePolicy,
    writer: SessionWriter,
    relay_stdout: bool,
}

impl CaptureHooks {
    pub fn new(writer: SessionWriter, policy: SanitizePolicy) -> Self {
        Self {
            policy,
            writer,
            relay_stdout: true,
        }
    }

    /// Disable the stdout envelope, e.g. when no supervisor is listening.
    pub fn without_stdout_relay(mut self) -> Self {
        self.relay_stdout = false;
        self
    }

    /// Request-side hook: record the outbound request.
    pub async fn on_request(&self, detail: &RequestDetail) -> LogRecord {
        let record = build_request_record(detail, &self.policy);
        self.persist(&record).await;
        record
    }

    /// Response-side hook: record the response with its request context.
    pub async fn on_response(
        &self,
        request: &RequestDetail,
        response: &ResponseDetail,
    ) -> LogRecord {
        let record = build_response_record(request, response, &self.policy);
        self.persist(&record).await;
        record
    }

    async fn persist(&self, record: &LogRecord) {
        if let Err(e) = self.writer.append(record).await {
            // Capture continues even when logging degrades
            warn!("Failed to append capture record: {e}");
        }

        if self.relay_stdout {
            if let Ok(line) = serde_json::to_string(&EngineEvent::log(record.clone())) {
                println!("{line}");
            }
        }
    }
}
