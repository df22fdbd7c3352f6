//! Script rules evaluated in an embedded Rhai engine.
//!
//! The script sees a single `request` constant (method, path, params,
//! query, headers, body) and must evaluate to a map whose optional
//! `status`, `headers`, `body` and `rawBody` entries populate the
//! response descriptor. A unit result yields an empty descriptor. The
//! file is re-read and re-evaluated per request, so edits take effect
//! immediately.

use super::ResponseDetail;
use crate::error::MockError;
use crate::request::MockRequest;
use rhai::{Dynamic, Engine, Map, Scope};
use serde_json::Value;
use std::collections::HashMap;

pub fn evaluate(script: &str, request: &MockRequest) -> Result<ResponseDetail, MockError> {
    let engine = Engine::new();
    let mut scope = Scope::new();
    scope.push_constant("request", request_to_map(request));

    let result: Dynamic = engine
        .eval_with_scope(&mut scope, script)
        .map_err(|e| MockError::Script(e.to_string()))?;

    parse_result(result)
}

fn request_to_map(request: &MockRequest) -> Map {
    let mut map = Map::new();
    map.insert("method".into(), Dynamic::from(request.method.clone()));
    map.insert("path".into(), Dynamic::from(request.path.clone()));
    map.insert("params".into(), Dynamic::from(string_map(&request.params)));
    map.insert("query".into(), Dynamic::from(string_map(&request.query)));
    map.insert("headers".into(), Dynamic::from(string_map(&request.headers)));
    map.insert("body".into(), json_to_dynamic(request.body.clone()));
    map
}

fn string_map(values: &HashMap<String, String>) -> Map {
    let mut map = Map::new();
    for (key, value) in values {
        map.insert(key.clone().into(), Dynamic::from(value.clone()));
    }
    map
}

fn parse_result(result: Dynamic) -> Result<ResponseDetail, MockError> {
    if result.is_unit() {
        return Ok(ResponseDetail::default());
    }

    let map = result
        .try_cast::<Map>()
        .ok_or_else(|| MockError::Script("script must return a map".to_string()))?;

    let mut detail = ResponseDetail::default();

    if let Some(status) = map.get("status") {
        let status = status
            .as_int()
            .map_err(|t| MockError::Script(format!("status must be an integer, got {t}")))?;
        let status = u16::try_from(status)
            .map_err(|_| MockError::Script(format!("status out of range: {status}")))?;
        detail.status = Some(status);
    }

    if let Some(headers) = map.get("headers") {
        let headers = headers
            .clone()
            .try_cast::<Map>()
            .ok_or_else(|| MockError::Script("headers must be a map".to_string()))?;
        let mut converted = HashMap::new();
        for (key, value) in headers {
            converted.insert(key.to_string(), dynamic_string(&value));
        }
        detail.headers = Some(converted);
    }

    if let Some(body) = map.get("body") {
        detail.body = Some(dynamic_string(body));
    }

    if let Some(raw_body) = map.get("rawBody") {
        detail.raw_body = Some(dynamic_string(raw_body));
    }

    Ok(detail)
}

/// String form of a script value: strings pass through, maps serialize to
/// JSON, everything else uses its display form.
fn dynamic_string(value: &Dynamic) -> String {
    if let Some(s) = value.clone().try_cast::<String>() {
        s
    } else if let Some(map) = value.clone().try_cast::<Map>() {
        serde_json::to_string(&dynamic_to_json(Dynamic::from(map)))
            .unwrap_or_else(|_| "{}".to_string())
    } else {
        value.to_string()
    }
}

fn json_to_dynamic(value: Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Dynamic::from(i)
            } else if let Some(f) = n.as_f64() {
                Dynamic::from(f)
            } else {
                Dynamic::UNIT
            }
        }
        Value::String(s) => Dynamic::from(s),
        Value::Array(arr) => {
            let vec: Vec<Dynamic> = arr.into_iter().map(json_to_dynamic).collect();
            Dynamic::from(vec)
        }
        Value::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.into(), json_to_dynamic(v));
            }
            Dynamic::from(map)
        }
    }
}

fn dynamic_to_json(value: Dynamic) -> Value {
    if value.is_unit() {
        Value::Null
    } else if let Ok(b) = value.as_bool() {
        Value::Bool(b)
    } else if let Ok(i) = value.as_int() {
        Value::Number(i.into())
    } else if let Ok(f) = value.as_float() {
        Value::Number(serde_json::Number::from_f64(f).unwrap_or(0.into()))
    } else if let Some(s) = value.clone().try_cast::<String>() {
        Value::String(s)
    } else if let Some(arr) = value.clone().try_cast::<Vec<Dynamic>>() {
        Value::Array(arr.into_iter().map(dynamic_to_json).collect())
    } else if let Some(map) = value.clone().try_cast::<Map>() {
        let mut obj = serde_json::Map::new();
        for (k, v) in map {
            obj.insert(k.to_string(), dynamic_to_json(v));
        }
        Value::Object(obj)
    } else {
        Value::String(format!("{value}"))
    }
}
