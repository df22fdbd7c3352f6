//! Rule evaluation: turns a rule file plus a request into a response
//! descriptor.
//!
//! Two formats are supported, dispatched on the file extension
//! (case-insensitive): declarative YAML rules (`.yml`) and Rhai scripts
//! (`.rhai`).

mod script;
mod yaml;

use crate::constants::{SCRIPT_PARSER_EXTENSION, YAML_PARSER_EXTENSION};
use crate::error::MockError;
use crate::request::MockRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Response descriptor produced by a rule.
///
/// Only fields the rule spelled out are present; defaults (status 200,
/// empty headers, empty body) are applied when the response is rendered.
/// `body` names a body file in the mock directory; `raw_body` is inline
/// text, ignored when `body` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

/// Evaluate the rule file at `path` (with `content` already read) against
/// a request.
pub fn evaluate(
    path: &Path,
    content: &str,
    request: &MockRequest,
) -> Result<ResponseDetail, MockError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some(SCRIPT_PARSER_EXTENSION) => script::evaluate(content, request),
        Some(YAML_PARSER_EXTENSION) => yaml::evaluate(content, request),
        _ => Err(MockError::UnsupportedFormat(path.to_path_buf())),
    }
}
