// src/interception/record.rs
//! Log records and the pure mapping from interception-hook arguments
//!
//! Field names are wire-compatible with the historical capture log format,
//! including its quirks (the response `headers_Host` field carries the
//! request URL). No I/O happens here.

use crate::sanitize::{sanitize, should_drop_body, SanitizePolicy};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One persisted request or response observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogRecord {
    Request(RequestRecord),
    Response(ResponseRecord),
}

impl LogRecord {
    pub fn record_type(&self) -> &'static str {
        match self {
            LogRecord::Request(_) => "request",
            LogRecord::Response(_) => "response",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            LogRecord::Request(r) => &r.url,
            LogRecord::Response(r) => &r.url,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            LogRecord::Request(r) => r.body.as_deref(),
            LogRecord::Response(r) => r.body.as_deref(),
        }
    }
}

/// An intercepted outbound request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub url: String,
    pub method: String,
    #[serde(rename = "headers_Host")]
    pub host: String,
    #[serde(rename = "requestHeaders_Origin")]
    pub origin: String,
    #[serde(rename = "requestHeaders_Content_Type")]
    pub content_type: String,
    #[serde(rename = "requestHeaders_Referer")]
    pub referer: String,
    #[serde(rename = "requestHeaders_Accept")]
    pub accept: String,
    pub body: Option<String>,
}

/// An intercepted response, paired with its request context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub url: String,
    pub method: String,
    /// Historical format quirk: carries the request URL, not a Host header
    #[serde(rename = "headers_Host")]
    pub host: String,
    #[serde(rename = "responseHeaders_Content_Type")]
    pub content_type: String,
    pub body: Option<String>,
}

/// Raw request-side arguments handed to an interception hook
#[derive(Debug, Clone, Default)]
pub struct RequestDetail {
    pub url: String,
    pub method: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

/// Raw response-side arguments handed to an interception hook
#[derive(Debug, Clone, Default)]
pub struct ResponseDetail {
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

/// Case-insensitive header lookup with an empty-string default
fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> &'a str {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
        .unwrap_or("")
}

fn body_text(body: Option<&Bytes>) -> Option<String> {
    body.map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

/// Build a request record from hook arguments.
pub fn build_request_record(detail: &RequestDetail, policy: &SanitizePolicy) -> LogRecord {
    let content_type = header(&detail.headers, "Content-Type").to_string();
    let raw_body = body_text(detail.body.as_ref());

    let body = if should_drop_body(Some(&content_type), &policy.drop_prefixes) {
        None
    } else {
        sanitize(raw_body.as_deref(), &content_type, policy.binary_policy)
    };

    LogRecord::Request(RequestRecord {
        url: detail.url.clone(),
        method: detail
            .method
            .clone()
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        host: header(&detail.headers, "Host").to_string(),
        origin: header(&detail.headers, "Origin").to_string(),
        content_type,
        referer: header(&detail.headers, "Referer").to_string(),
        accept: header(&detail.headers, "Accept").to_string(),
        body,
    })
}

/// Build a response record; URL and method come from the paired request.
pub fn build_response_record(
    request: &RequestDetail,
    response: &ResponseDetail,
    policy: &SanitizePolicy,
) -> LogRecord {
    let content_type = header(&response.headers, "Content-Type").to_string();
    let raw_body = body_text(response.body.as_ref());

    let body = if should_drop_body(Some(&content_type), &policy.drop_prefixes) {
        None
    } else {
        sanitize(raw_body.as_deref(), &content_type, policy.binary_policy)
    };

    LogRecord::Response(ResponseRecord {
        url: request.url.clone(),
        method: request
            .method
            .clone()
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        host: request.url.clone(),
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SanitizePolicy {
        SanitizePolicy::default()
    }

    fn request_detail(content_type: &str, body: &str) -> RequestDetail {
        RequestDetail {
            url: "https://api.example.com/v1/items".to_string(),
            method: Some("POST".to_string()),
            headers: HashMap::from([
                ("Host".to_string(), "api.example.com".to_string()),
                ("Content-Type".to_string(), content_type.to_string()),
                ("Accept".to_string(), "*/*".to_string()),
            ]),
            body: Some(Bytes::copy_from_slice(body.as_bytes())),
        }
    }

    #[test]
    fn test_request_record_fields() {
        let detail = request_detail("application/json", r#"{"a":1}"#);
        let record = build_request_record(&detail, &policy());

        match record {
            LogRecord::Request(r) => {
                assert_eq!(r.url, "https://api.example.com/v1/items");
                assert_eq!(r.method, "POST");
                assert_eq!(r.host, "api.example.com");
                assert_eq!(r.origin, "");
                assert_eq!(r.accept, "*/*");
                assert_eq!(r.body.as_deref(), Some(r#"{"a":1}"#));
            }
            LogRecord::Response(_) => panic!("expected a request record"),
        }
    }

    #[test]
    fn test_missing_method_defaults_to_unknown() {
        let mut detail = request_detail("", "");
        detail.method = None;
        detail.body = None;

        let record = build_request_record(&detail, &policy());
        match record {
            LogRecord::Request(r) => {
                assert_eq!(r.method, "UNKNOWN");
                assert_eq!(r.body, None);
            }
            LogRecord::Response(_) => panic!("expected a request record"),
        }
    }

    #[test]
    fn test_drop_list_gates_request_body() {
        let detail = request_detail("image/png", "fake image bytes");
        let record = build_request_record(&detail, &policy());
        assert_eq!(record.body(), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut detail = request_detail("application/json", "{}");
        detail.headers = HashMap::from([
            ("host".to_string(), "lower.example.com".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ]);

        match build_request_record(&detail, &policy()) {
            LogRecord::Request(r) => {
                assert_eq!(r.host, "lower.example.com");
                assert_eq!(r.content_type, "application/json");
            }
            LogRecord::Response(_) => panic!("expected a request record"),
        }
    }

    #[test]
    fn test_response_host_carries_request_url() {
        let request = request_detail("application/json", "{}");
        let response = ResponseDetail {
            headers: HashMap::from([(
                "Content-Type".to_string(),
                "text/plain".to_string(),
            )]),
            body: Some(Bytes::from_static(b" ok ")),
        };

        match build_response_record(&request, &response, &policy()) {
            LogRecord::Response(r) => {
                assert_eq!(r.host, "https://api.example.com/v1/items");
                assert_eq!(r.method, "POST");
                assert_eq!(r.content_type, "text/plain");
                assert_eq!(r.body.as_deref(), Some("ok"));
            }
            LogRecord::Request(_) => panic!("expected a response record"),
        }
    }

    #[test]
    fn test_wire_format_field_names() {
        let detail = request_detail("application/json", "{}");
        let record = build_request_record(&detail, &policy());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], "request");
        assert_eq!(value["headers_Host"], "api.example.com");
        assert!(value.get("requestHeaders_Content_Type").is_some());
        assert!(value.get("requestHeaders_Origin").is_some());

        let response = build_response_record(&detail, &ResponseDetail::default(), &policy());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "response");
        assert!(value.get("responseHeaders_Content_Type").is_some());
        // Dropped bodies serialize as explicit nulls
        assert!(value["body"].is_null());
    }

    #[test]
    fn test_record_round_trips_through_serde() {
        let detail = request_detail("application/json", r#"{"k":"v"}"#);
        let record = build_request_record(&detail, &policy());

        let json = serde_json::to_string(&record).unwrap();
        let parsed: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
