// src/recording/reader.rs
//! Session file index and reader
//!
//! Lists capture sessions and parses a session file back into records. The
//! persisted format is bracket-less (`<record>,\n` lines with no closing
//! delimiter), so reading goes through one repair step: strip the trailing
//! separator, wrap in `[...]`, parse. That repair lives in exactly one
//! place — `repair_session_text`.

use crate::interception::record::LogRecord;
use crate::utils::errors::{CaptureError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// One capture session on disk
#[derive(Debug, Clone, Serialize)]
pub struct SessionFile {
    pub name: String,
    pub path: PathBuf,
    #[serde(rename = "modifiedAt")]
    pub modified_at: DateTime<Utc>,
}

/// List capture sessions in `dir`, most-recently-modified first.
///
/// Entries without the expected extension are filtered out; unreadable
/// entries are skipped, and a missing directory yields an empty list —
/// one bad session never hides the others.
pub async fn list_sessions(dir: &Path, extension: &str) -> Result<Vec<SessionFile>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CaptureError::Storage(format!(
                "failed to read session directory {}: {e}",
                dir.display()
            )))
        }
    };

    let mut sessions = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                return Err(CaptureError::Storage(format!(
                    "failed to enumerate {}: {e}",
                    dir.display()
                )))
            }
        };

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        sessions.push(SessionFile {
            name,
            path,
            modified_at,
        });
    }

    sessions.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

    debug!("Found {} session file(s) in {}", sessions.len(), dir.display());

    Ok(sessions)
}

/// Repair raw session text into a parseable JSON array: trim trailing
/// whitespace, strip one trailing comma, wrap in brackets.
pub fn repair_session_text(raw: &str) -> String {
    let trimmed = raw.trim_end();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    format!("[{trimmed}]")
}

/// Read a session file back into records.
///
/// A `Parse` error means "not yet readable" — the writer may have been
/// interrupted mid-record — and callers may retry later.
pub async fn read_session(path: &Path) -> Result<Vec<LogRecord>> {
    let raw = fs::read_to_string(path).await.map_err(|e| {
        CaptureError::Storage(format!(
            "failed to read session file {}: {e}",
            path.display()
        ))
    })?;

    let repaired = repair_session_text(&raw);

    serde_json::from_str(&repaired).map_err(|e| {
        CaptureError::Parse(format!(
            "session file {} is not yet readable: {e}",
            path.display()
        ))
    })
}
