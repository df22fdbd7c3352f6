//! Transport-free request and response types seen by the rule evaluator.

use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;

/// Incoming request after the transport layer has decoded it.
#[derive(Debug, Clone, Default)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    /// Named path parameters extracted by the router (`:id` segments).
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    /// Decoded body: structured for JSON, a string map for form data,
    /// raw text otherwise, `Null` when the request carried no body.
    pub body: Value,
}

/// Response produced by the engine, ready for the transport layer.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl MockResponse {
    /// Empty response with the given status.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Parse a query string into a map, URL-decoding keys and values.
/// Keys without a value (`?flag`) map to an empty string.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            let key = urlencoding::decode(key).unwrap_or_default().into_owned();
            let value = urlencoding::decode(value).unwrap_or_default().into_owned();
            Some((key, value))
        })
        .collect()
}

/// Decode a request body according to its content type.
///
/// JSON bodies become structured values so rules can match nested fields.
/// A JSON body that fails to parse is kept as raw text rather than dropped.
pub fn parse_body(content_type: &str, bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    let text = String::from_utf8_lossy(bytes);
    if content_type.contains("application/json") {
        serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.into_owned()))
    } else if content_type.contains("application/x-www-form-urlencoded") {
        let fields = parse_query_string(&text)
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Value::Object(fields)
    } else {
        Value::String(text.into_owned())
    }
}
