//! Loosely typed tool arguments.
//!
//! Arguments arrive as a JSON object. Accessors here read them without
//! taking ownership and hand back owned copies wherever a value ends up in a
//! compiled request.

use crate::compiler::encoding::{has_dot_segment, Namespace, NAMESPACE_REQUIRED};
use crate::compiler::request::{copy_body, copy_params, HttpMethod, ParamMap, RequestDescriptor};
use crate::types::{non_blank, Error, Result};
use serde_json::{Map, Value};

/// Named entities that tool arguments may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Catalog,
    Table,
    Principal,
    PrincipalRole,
    CatalogRole,
    Policy,
}

impl NameField {
    /// Accepted argument keys, preferred spelling first.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            NameField::Catalog => &["catalog"],
            NameField::Table => &["table"],
            NameField::Principal => &["principal"],
            NameField::PrincipalRole => &["principalRole", "principal_role"],
            NameField::CatalogRole => &["catalogRole", "catalog_role"],
            NameField::Policy => &["policy"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NameField::Catalog => "Catalog",
            NameField::Table => "Table",
            NameField::Principal => "Principal",
            NameField::PrincipalRole => "Principal role",
            NameField::CatalogRole => "Catalog role",
            NameField::Policy => "Policy",
        }
    }
}

/// Borrowed view over a tool's JSON arguments.
#[derive(Debug, Clone, Copy)]
pub struct ToolArguments<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> ToolArguments<'a> {
    pub fn new(arguments: &'a Value) -> Result<Self> {
        let map = arguments
            .as_object()
            .ok_or_else(|| Error::validation("Tool arguments must be a JSON object"))?;
        Ok(Self { map })
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn operation(&self) -> Result<&'a str> {
        non_blank(self.get("operation").and_then(Value::as_str))
            .ok_or_else(|| Error::validation("Operation must be provided"))
    }

    /// Trimmed, non-blank name for `field`, if present.
    pub fn name(&self, field: NameField) -> Option<&'a str> {
        field
            .keys()
            .iter()
            .find_map(|key| non_blank(self.get(key).and_then(Value::as_str)))
    }

    /// Name for `field`, usable as a path segment.
    pub fn require_name(&self, field: NameField) -> Result<&'a str> {
        let name = self.name(field).ok_or_else(|| {
            Error::validation(format!("{} name is required for this operation", field.label()))
        })?;
        if has_dot_segment(name) {
            return Err(Error::validation(format!(
                "{} name must not be '.' or '..'",
                field.label()
            )));
        }
        Ok(name)
    }

    /// Required namespace, as a string or a sequence of segments.
    pub fn namespace(&self) -> Result<Namespace> {
        match self.get("namespace") {
            None => Err(Error::validation(NAMESPACE_REQUIRED)),
            Some(value) => namespace_from_value(value),
        }
    }

    /// Namespace if one was supplied; a supplied namespace is still validated.
    pub fn optional_namespace(&self) -> Result<Option<Namespace>> {
        self.get("namespace").map(namespace_from_value).transpose()
    }

    pub fn query(&self) -> Result<ParamMap> {
        copy_params(self.get("query"), "query")
    }

    pub fn headers(&self) -> Result<ParamMap> {
        copy_params(self.get("headers"), "headers")
    }

    /// Deep copy of the request body, if any.
    pub fn body(&self) -> Option<Value> {
        copy_body(self.get("body"))
    }

    /// Deep copy of the request body; `verb` names the operation in the error.
    pub fn require_body(&self, verb: &str) -> Result<Value> {
        self.body()
            .ok_or_else(|| Error::validation(format!("{verb} operations require a request body")))
    }

    pub fn realm(&self) -> Option<&'a str> {
        non_blank(self.get("realm").and_then(Value::as_str))
    }

    /// Assemble the descriptor with copied query and headers.
    pub fn descriptor(
        &self,
        method: HttpMethod,
        path: String,
        body: Option<Value>,
    ) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::new(method, path)
            .with_query(self.query()?)
            .with_headers(self.headers()?)
            .with_body(body))
    }
}

fn namespace_from_value(value: &Value) -> Result<Namespace> {
    match value {
        Value::String(name) => Namespace::single(name),
        Value::Array(items) => Namespace::from_segments(items.iter().map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })),
        _ => Err(Error::validation(
            "Namespace must be a string or an array of strings",
        )),
    }
}
