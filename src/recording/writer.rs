// src/recording/writer.rs
//! Append-only session log writer
//!
//! One file per capture session. Each append opens the file, writes one
//! `<record-json>,\n` line, and closes — no buffering across calls, each
//! call independently durable. An async mutex serializes appends so
//! concurrent request/response hooks never interleave mid-line.
//!
//! No closing array bracket is ever written; files are readable only
//! through the reader's repair step.

use crate::interception::record::LogRecord;
use crate::utils::errors::{CaptureError, Result};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Writer for one capture session file
pub struct SessionWriter {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SessionWriter {
    /// Create a writer for the given session file. The file itself is
    /// created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. I/O errors surface to the caller; there is no
    /// retry and no partial-line cleanup.
    pub async fn append(&self, record: &LogRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).map_err(|e| {
            CaptureError::Storage(format!("record serialization failed: {e}"))
        })?;
        line.push_str(",\n");

        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                CaptureError::Storage(format!(
                    "failed to open session file {}: {e}",
                    self.path.display()
                ))
            })?;

        file.write_all(line.as_bytes()).await.map_err(|e| {
            CaptureError::Storage(format!(
                "failed to append to session file {}: {e}",
                self.path.display()
            ))
        })?;

        file.flush().await.map_err(|e| {
            CaptureError::Storage(format!(
                "failed to flush session file {}: {e}",
                self.path.display()
            ))
        })?;

        debug!("Appended {} record to {}", record.record_type(), self.path.display());

        Ok(())
    }
}
