// src/utils/errors.rs
//! Error types for the capture engine
//!
//! One taxonomy for the whole crate. Sanitization failures are deliberately
//! absent: they always resolve to a dropped body and never surface.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Capture engine errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Rejected before any I/O or process work (bad filename, bad request)
    #[error("validation error: {0}")]
    Validation(String),

    /// Engine executable missing or failed to launch
    #[error("spawn error: {0}")]
    Spawn(String),

    /// Engine crashed, was killed externally, or lost its handle
    #[error("engine process error: {0}")]
    Runtime(String),

    /// Session file or capture directory I/O failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Session file not well-formed; recoverable, the writer may still be
    /// mid-record
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration could not be loaded or deserialized
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CaptureError {
    /// True for errors callers may retry later without operator action
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CaptureError::Parse(_))
    }
}
