// src/lib.rs
//! Capture Engine Library
//!
//! Traffic-interception and log-sanitization core: the component that sits
//! behind an external HTTP(S) interception engine, decides what to retain
//! from observed exchanges, redacts binary/opaque payloads, persists an
//! append-only per-session log, and supervises the engine process.
//!
//! # Architecture
//!
//! - **sanitize**: pure keep/drop/redact decisions for payload bodies
//! - **interception**: record building and the per-exchange hook façade
//! - **recording**: append-only session files, listing, and repair-on-read
//! - **supervisor**: engine process lifecycle and stdout event relay
//! - **observability**: tracing setup
//! - **utils**: errors and configuration

// Public module exports
pub mod interception;
pub mod observability;
pub mod recording;
pub mod sanitize;
pub mod supervisor;
pub mod utils;

// Re-export commonly used types
pub use interception::{CaptureHooks, LogRecord};
pub use recording::{list_sessions, read_session, SessionWriter};
pub use sanitize::{BinaryPolicy, SanitizePolicy};
pub use supervisor::{EngineSupervisor, SupervisorConfig, SupervisorState};
pub use utils::config::CaptureConfig;
pub use utils::errors::{CaptureError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
