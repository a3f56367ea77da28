// src/recording/mod.rs
//! Capture session persistence
//!
//! - **Writer**: durable per-record appends to one file per session
//! - **Reader**: session listing and the repair-on-read adapter for the
//!   bracket-less on-disk format
//!
//! # Format
//!
//! ```text
//! <record-json>,\n
//! <record-json>,\n
//! ...
//! ```
//!
//! No enclosing array is ever written; the reader strips the trailing
//! separator and wraps the remainder in brackets before parsing.

pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use reader::{list_sessions, read_session, SessionFile};
pub use writer::SessionWriter;
