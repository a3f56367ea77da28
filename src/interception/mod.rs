// src/interception/mod.rs
//! Interception-side record building
//!
//! The interception engine itself is external; this module is the code on
//! our side of its hook boundary:
//!
//! - **Record**: `LogRecord` and the pure hook-arguments-to-record mapping
//! - **Hooks**: the per-exchange façade wiring sanitization, the session
//!   writer, and the stdout event relay together
//!
//! ```text
//! engine hook args ─> build_*_record ─> LogRecord ─┬─> SessionWriter (file)
//!                      (classify + sanitize)       └─> stdout envelope
//! ```

pub mod hooks;
pub mod record;

// Re-export commonly used types
pub use hooks::CaptureHooks;
pub use record::{
    build_request_record, build_response_record, LogRecord, RequestDetail, RequestRecord,
    ResponseDetail, ResponseRecord,
};
