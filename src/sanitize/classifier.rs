// src/sanitize/classifier.rs
//! Content classification: keep, drop, or redact a payload
//!
//! Two independent decisions feed the sanitizer:
//!
//! - **Drop by content-type**: case-insensitive prefix match against a
//!   configurable MIME drop list (images, compiled bundles, structured
//!   binary encodings, URL-encoded forms).
//! - **Binary/encoded probe**: two policies exist in the wild and are kept
//!   as separately selectable strategies rather than unified by guesswork.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binary-detection strategy for payload bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryPolicy {
    /// Escape-density heuristic: high ratio of `\uXXXX` escapes, or a
    /// control character in `0x00..=0x03`
    Generic,

    /// Parse-first heuristic: JSON payloads are inspected for buffer
    /// markers and base64 blobs; unparseable text falls back to a wider
    /// control-character scan
    Structured,
}

/// Whether a payload body should be dropped outright based on content-type.
///
/// An absent or empty content-type keeps the body; the drop list is built
/// with non-overlapping prefixes, so match order does not matter.
pub fn should_drop_body(content_type: Option<&str>, drop_prefixes: &[String]) -> bool {
    let content_type = match content_type {
        Some(ct) if !ct.is_empty() => ct.to_ascii_lowercase(),
        _ => return false,
    };

    drop_prefixes
        .iter()
        .any(|prefix| content_type.starts_with(&prefix.to_ascii_lowercase()))
}

/// Whether a body looks like binary or opaquely-encoded data under the
/// selected policy. Empty bodies are never binary.
pub fn looks_binary_or_encoded(body: &str, policy: BinaryPolicy) -> bool {
    if body.is_empty() {
        return false;
    }

    match policy {
        BinaryPolicy::Generic => generic_probe(body),
        BinaryPolicy::Structured => structured_probe(body),
    }
}

/// Escape-density probe: more than one `\uXXXX` escape per 20 characters,
/// or any control character in `0x00..=0x03`.
fn generic_probe(body: &str) -> bool {
    if count_unicode_escapes(body) * 20 > body.len() {
        return true;
    }
    body.chars().any(|c| ('\u{0000}'..='\u{0003}').contains(&c))
}

/// Parse-first probe: inspect parsed JSON for buffer representations; on
/// parse failure scan the raw text for opaque control characters.
fn structured_probe(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => parsed_value_is_binary(&value),
        Err(_) => body.chars().any(is_opaque_control),
    }
}

/// Whether an already-parsed JSON value represents binary content: a raw
/// byte array, an explicit `{"type": "Buffer"|"Binary"}` marker, or a
/// `data` field holding an all-base64-alphabet string of length >= 20.
pub(crate) fn parsed_value_is_binary(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.as_u64().is_some_and(|n| n <= 0xFF))
        }
        Value::Object(fields) => {
            if matches!(
                fields.get("type").and_then(Value::as_str),
                Some("Buffer") | Some("Binary")
            ) {
                return true;
            }
            fields
                .get("data")
                .and_then(Value::as_str)
                .is_some_and(is_base64_blob)
        }
        _ => false,
    }
}

fn is_base64_blob(text: &str) -> bool {
    text.len() >= 20
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

fn is_opaque_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}

/// Count `\uXXXX`-style escape sequences in the raw text.
fn count_unicode_escapes(body: &str) -> usize {
    let bytes = body.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i + 6 <= bytes.len() {
        if bytes[i] == b'\\'
            && bytes[i + 1].eq_ignore_ascii_case(&b'u')
            && bytes[i + 2..i + 6].iter().all(u8::is_ascii_hexdigit)
        {
            count += 1;
            i += 6;
        } else {
            i += 1;
        }
    }
    count
}
