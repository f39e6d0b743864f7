//! Response Body Parsing
//!
//! Decides between a parsed JSON body and raw text based on the declared
//! content type, and derives the type skeleton of JSON bodies.

use serde::Serialize;
use serde_json::{Map, Value};

/// Nesting depth past which skeletons collapse to `"..."`
pub const MAX_STRUCTURE_DEPTH: usize = 3;

/// Body of a forwarded response: parsed when structured, raw text otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }
}

/// Whether a content-type header declares JSON
///
/// Matches `application/json` anywhere in the value (parameters such as
/// `charset` are ignored) and structured suffixes like `application/problem+json`.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let lowered = content_type.to_ascii_lowercase();
    if lowered.contains("application/json") {
        return true;
    }

    lowered
        .split(';')
        .next()
        .map(|essence| essence.trim().ends_with("+json"))
        .unwrap_or(false)
}

/// Normalize a response body
///
/// - Declared JSON that parses → `Json`
/// - Declared JSON that does not parse → `Text` with the raw content
/// - Anything else → `Text`
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> ResponseBody {
    if is_json_content_type(content_type) {
        if let Ok(value) = serde_json::from_slice::<Value>(body) {
            return ResponseBody::Json(value);
        }
    }
    ResponseBody::Text(String::from_utf8_lossy(body).to_string())
}

/// Type skeleton of a JSON value
///
/// Objects map each key to its value's type name, arrays are represented by
/// their first element, and anything nested deeper than
/// [`MAX_STRUCTURE_DEPTH`] becomes `"..."`. `null` reports as `"object"`.
pub fn json_structure(value: &Value, depth: usize) -> Value {
    if depth > MAX_STRUCTURE_DEPTH {
        return Value::from("...");
    }

    match value {
        Value::Array(items) => match items.first() {
            Some(first) => Value::Array(vec![json_structure(first, depth + 1)]),
            None => Value::Array(Vec::new()),
        },
        Value::Object(fields) => {
            let mut structure = Map::new();
            for (key, field) in fields {
                let shape = match field {
                    Value::Object(_) | Value::Array(_) | Value::Null => {
                        json_structure(field, depth + 1)
                    }
                    other => Value::from(type_name(other)),
                };
                structure.insert(key.clone(), shape);
            }
            Value::Object(structure)
        }
        other => Value::from(type_name(other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}
