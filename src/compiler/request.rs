//! Compiled request descriptor and the owned copies that feed it.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP method of a compiled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query or header value: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    /// All values, in order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            ParamValue::Single(value) => std::slice::from_ref(value),
            ParamValue::Multi(values) => values,
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

/// Query parameters or headers keyed by name.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Canonical, encoding-complete description of an outbound REST call.
///
/// `path` is already percent-encoded and relative to the API prefix of the
/// tool that produced it. Every value is an owned copy of caller input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub query: ParamMap,
    #[serde(default)]
    pub headers: ParamMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: ParamMap::new(),
            headers: ParamMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: ParamMap) -> Self {
        self.query = query;
        self
    }

    pub fn with_headers(mut self, headers: ParamMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }
}

/// Copy a caller-supplied query/header mapping.
///
/// Null values are dropped, scalars are stringified and sequences become
/// lists of strings (null elements skipped). Nested objects are carried as
/// their JSON text.
pub fn copy_params(value: Option<&Value>, field: &str) -> Result<ParamMap> {
    let map = match value {
        None | Some(Value::Null) => return Ok(ParamMap::new()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(Error::validation(format!("{field} must be an object"))),
    };

    let mut copied = ParamMap::new();
    for (key, value) in map {
        let copy = match value {
            Value::Null => continue,
            Value::Array(items) => ParamValue::Multi(
                items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(stringify)
                    .collect(),
            ),
            other => ParamValue::Single(stringify(other)),
        };
        copied.insert(key.clone(), copy);
    }
    Ok(copied)
}

/// Independent deep copy of a request body; `null` means no body.
pub fn copy_body(body: Option<&Value>) -> Option<Value> {
    body.filter(|value| !value.is_null()).cloned()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
