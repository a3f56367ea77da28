// src/supervisor/events.rs
//! Structured event relay from the interception engine
//!
//! The engine process prints one JSON envelope per captured record on
//! stdout: `{"timestamp": <ISO-8601>, "type": "log", "data": <record>}`.
//! Conforming lines land in a bounded most-recent-N ring buffer that the
//! dashboard collaborator polls; everything else on stdout is diagnostic
//! noise and is silently ignored.

use crate::interception::record::LogRecord;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One structured stdout event from the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: LogRecord,
}

impl EngineEvent {
    /// Wrap a record in the `log` envelope, stamped now.
    pub fn log(data: LogRecord) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: "log".to_string(),
            data,
        }
    }
}

/// Opportunistically parse one stdout line as a `log` event.
///
/// Non-conforming lines return `None` — never an error.
pub fn parse_event_line(line: &str) -> Option<EngineEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let event: EngineEvent = serde_json::from_str(line).ok()?;
    (event.kind == "log").then_some(event)
}

/// Bounded most-recent-N buffer of relayed records.
///
/// Newest entries win: on overflow the oldest are discarded, keeping the
/// buffer a live view of recent traffic.
pub struct EventBuffer {
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl EventBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Push a record, evicting the oldest beyond capacity.
    pub fn push(&self, record: LogRecord) {
        let mut records = self.records.lock();
        records.push_front(record);
        records.truncate(self.capacity);
    }

    /// Snapshot of buffered records, newest first.
    pub fn recent(&self) -> Vec<LogRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
