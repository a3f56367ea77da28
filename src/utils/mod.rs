// src/utils/mod.rs
//! Common utilities: errors and configuration

pub mod config;
pub mod errors;

pub use config::CaptureConfig;
pub use errors::{CaptureError, Result};
