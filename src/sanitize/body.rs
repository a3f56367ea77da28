// src/sanitize/body.rs
//! Body sanitization: normalize or redact a payload before persistence
//!
//! A pure transform with no I/O. Every failure path resolves to `None`
//! ("drop the body"); nothing here ever returns an error.

use crate::sanitize::classifier::{looks_binary_or_encoded, parsed_value_is_binary, BinaryPolicy};
use serde_json::Value;

/// Sanitize a raw payload for storage.
///
/// Returns `None` when the body is absent, empty, classified as binary, or
/// fails normalization. JSON-like payloads are re-serialized canonically;
/// `text/*` payloads get escape sequences and whitespace collapsed;
/// everything else passes through unchanged.
pub fn sanitize(raw: Option<&str>, content_type: &str, policy: BinaryPolicy) -> Option<String> {
    let body = raw?;
    if body.is_empty() {
        return None;
    }

    if looks_binary_or_encoded(body, policy) {
        return None;
    }

    if content_type.contains("application/json") {
        let parsed: Value = serde_json::from_str(body).ok()?;
        // The decoded payload may still be a buffer in JSON clothing
        if parsed_value_is_binary(&parsed) {
            return None;
        }
        return serde_json::to_string(&parsed).ok();
    }

    if content_type.starts_with("text/") {
        return Some(clean_text(body));
    }

    Some(body.to_string())
}

/// Collapse literal `\n`/`\t` escapes and whitespace runs to single spaces,
/// un-escape doubled quotes, and trim.
fn clean_text(body: &str) -> String {
    let unescaped = body
        .replace("\\n", " ")
        .replace("\\t", " ")
        .replace("\\\"", "\"");

    unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}
