//! Response envelope handling.
//!
//! Backends answer with a bare array or object, a `{data: ...}` wrapper, or
//! a `{status, data, msg}` triple. These helpers strip the envelope, detect
//! in-band rejections, and rename backend fields to the canonical names the
//! domain types expect.

use crate::error::ApiError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Payload and optional pagination/meta block of a successful response
pub type Unwrapped = (Value, Option<Value>);

/// Strip the envelope from a decoded 2xx body.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] for `status: false`, `status: "error"` or
/// `success: false` envelopes.
pub fn unwrap(body: Value, http_status: u16) -> Result<Unwrapped, ApiError> {
    let Value::Object(mut object) = body else {
        return Ok((body, None));
    };

    if is_rejection(&object) {
        return Err(ApiError::Rejected {
            status: http_status,
            message: message_of(&object).unwrap_or_else(|| "Request was rejected".to_string()),
            data: object.remove("data").or_else(|| object.remove("errors")),
        });
    }

    let meta = object.remove("meta").or_else(|| object.remove("pagination"));

    let is_envelope = object.contains_key("data")
        && object
            .keys()
            .all(|key| matches!(key.as_str(), "data" | "status" | "success" | "msg" | "message"));

    if is_envelope {
        let data = object.remove("data").unwrap_or(Value::Null);
        Ok((data, meta))
    } else {
        Ok((Value::Object(object), meta))
    }
}

fn is_rejection(object: &Map<String, Value>) -> bool {
    let status_rejects = match object.get("status") {
        Some(Value::Bool(ok)) => !ok,
        Some(Value::String(status)) => {
            matches!(status.to_ascii_lowercase().as_str(), "error" | "failed" | "fail")
        },
        _ => false,
    };

    status_rejects || matches!(object.get("success"), Some(Value::Bool(false)))
}

/// Human-readable message from an envelope or error body
pub fn message_of(object: &Map<String, Value>) -> Option<String> {
    ["msg", "message", "error"]
        .iter()
        .find_map(|key| match object.get(*key) {
            Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
            Some(Value::Object(nested)) => message_of(nested),
            _ => None,
        })
}

/// Extract a list of records from a payload
///
/// Accepts a bare array or an object holding the array under `items`,
/// `results`, `records`, or `data`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when no array can be found.
pub fn into_list(payload: Value) -> Result<Vec<Value>, ApiError> {
    match payload {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut object) => ["items", "results", "records", "data"]
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| ApiError::Decode("expected a list of records".to_string())),
        other => Err(ApiError::Decode(format!("expected a list of records, got {other}"))),
    }
}

/// Copy backend-named fields to their canonical names
///
/// `fields` maps canonical name → backend name. Canonical fields already
/// present are left untouched.
pub fn normalize(record: &mut Value, fields: &BTreeMap<String, String>) {
    let Value::Object(object) = record else {
        return;
    };

    for (canonical, backend) in fields {
        if object.contains_key(canonical) {
            continue;
        }
        if let Some(value) = object.get(backend).cloned() {
            object.insert(canonical.clone(), value);
        }
    }
}
