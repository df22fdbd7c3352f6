//! Declarative YAML rules.
//!
//! A rule file is either a single mapping, used directly as the response
//! descriptor, or a sequence of `{if, then}` entries evaluated in file
//! order where the first matching entry wins.

use super::ResponseDetail;
use crate::error::MockError;
use crate::request::MockRequest;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One entry in a rule list. An absent `if` matches unconditionally; an
/// absent `then` produces an empty response descriptor.
#[derive(Debug, Deserialize)]
struct RuleEntry {
    #[serde(rename = "if")]
    condition: Option<Condition>,
    then: Option<ResponseDetail>,
}

/// Request condition. Every present group must match in full (AND across
/// groups and across keys); an absent group matches unconditionally.
#[derive(Debug, Default, Deserialize)]
struct Condition {
    params: Option<HashMap<String, Value>>,
    query: Option<HashMap<String, Value>>,
    body: Option<HashMap<String, Value>>,
}

pub fn evaluate(content: &str, request: &MockRequest) -> Result<ResponseDetail, MockError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(content)?;
    match doc {
        serde_yaml::Value::Sequence(entries) => {
            for entry in entries {
                let entry: RuleEntry = serde_yaml::from_value(entry)?;
                if condition_matches(entry.condition.as_ref(), request) {
                    return Ok(entry.then.unwrap_or_default());
                }
            }
            Err(MockError::NoMatch)
        }
        serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(doc)?),
        // Empty and scalar documents carry no response details.
        _ => Ok(ResponseDetail::default()),
    }
}

fn condition_matches(condition: Option<&Condition>, request: &MockRequest) -> bool {
    let Some(condition) = condition else {
        return true;
    };

    if let Some(params) = &condition.params {
        let all_match = params.iter().all(|(key, expected)| {
            request
                .params
                .get(key)
                .is_some_and(|actual| coercing_eq(actual, expected))
        });
        if !all_match {
            return false;
        }
    }

    if let Some(query) = &condition.query {
        let all_match = query.iter().all(|(key, expected)| {
            request
                .query
                .get(key)
                .is_some_and(|actual| expected.as_str() == Some(actual.as_str()))
        });
        if !all_match {
            return false;
        }
    }

    if let Some(body) = &condition.body {
        let all_match = body.iter().all(|(key, expected)| {
            request
                .body
                .get(key)
                .is_some_and(|actual| is_partial_match(actual, expected))
        });
        if !all_match {
            return false;
        }
    }

    true
}

/// Path parameters always arrive as strings, while rules may spell the
/// expected value as a bare scalar. Scalars compare by their canonical
/// string representation, so `5` matches `"5"` and `true` matches
/// `"true"`; non-scalar expectations never match.
fn coercing_eq(actual: &str, expected: &Value) -> bool {
    match expected {
        Value::String(s) => actual == s,
        Value::Number(n) => actual == n.to_string(),
        Value::Bool(b) => actual == if *b { "true" } else { "false" },
        _ => false,
    }
}

/// Partial deep matching: every expected key must exist with a matching
/// value, extra keys on the request side are ignored, mappings recurse,
/// and an expected sequence is a positional prefix of the actual one.
/// Leaves compare strictly by type and value.
fn is_partial_match(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => {
            expected.iter().all(|(key, expected)| {
                actual
                    .get(key)
                    .is_some_and(|actual| is_partial_match(actual, expected))
            })
        }
        (Value::Array(actual), Value::Array(expected)) => {
            expected.len() <= actual.len()
                && expected
                    .iter()
                    .zip(actual.iter())
                    .all(|(expected, actual)| is_partial_match(actual, expected))
        }
        _ => actual == expected,
    }
}
