//! Tool catalog: typed parameter metadata, validation, input schemas.
//!
//! Owns tool *metadata*; request compilation lives in [`crate::compiler`].

use crate::compiler::EntityKind;
use crate::types::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    /// A string or an array (namespaces).
    StringOrList,
    Object,
    Any,
    Optional(Box<ParamType>),
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::StringOrList => {
                if value.is_string() || value.is_array() {
                    Ok(())
                } else {
                    Err(format!(
                        "expected string or array, got {}",
                        value_type_name(value)
                    ))
                }
            }
            ParamType::Object => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(format!("expected object, got {}", value_type_name(value)))
                }
            }
            ParamType::Any => Ok(()),
            ParamType::Optional(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate(value)
                }
            }
        }
    }

    /// Human-readable type name for listings.
    pub fn display_name(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::StringOrList => "string|string[]".to_string(),
            ParamType::Object => "object".to_string(),
            ParamType::Any => "any".to_string(),
            ParamType::Optional(inner) => inner.display_name(),
        }
    }

    /// JSON Schema fragment.
    pub fn json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::StringOrList => json!({
                "anyOf": [
                    {"type": "string"},
                    {"type": "array", "items": {"type": "string"}},
                ]
            }),
            ParamType::Object => json!({
                "type": "object",
                "additionalProperties": {
                    "anyOf": [
                        {"type": "string"},
                        {"type": "array", "items": {"type": "string"}},
                    ]
                }
            }),
            ParamType::Any => json!({}),
            ParamType::Optional(inner) => inner.json_schema(),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    /// Alternate spellings accepted on input but not advertised.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            aliases: Vec::new(),
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self::required(name, ParamType::Optional(Box::new(param_type)), description)
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn is_required(&self) -> bool {
        !matches!(self.param_type, ParamType::Optional(_))
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.iter().any(|alias| alias == key)
    }
}

// =============================================================================
// Tool entry
// =============================================================================

/// Complete tool metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
    pub kind: EntityKind,
}

impl ToolEntry {
    /// One-line summary.
    ///
    /// Format: `- tool-name(param1: type, param2?: type): description`
    pub fn summary_line(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                let optional = if p.is_required() { "" } else { "?" };
                format!("{}{}: {}", p.name, optional, p.param_type.display_name())
            })
            .collect();

        format!("- {}({}): {}", self.name, params.join(", "), self.description)
    }

    /// JSON Schema describing the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut schema = param.param_type.json_schema();
            if let Value::Object(map) = &mut schema {
                map.insert("description".to_string(), Value::from(param.description.clone()));
            }
            properties.insert(param.name.clone(), schema);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Definition as advertised to tool clients.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// In-memory tool catalog. Owns metadata, not implementations.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    entries: HashMap<String, ToolEntry>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a tool entry.
    pub fn register(&mut self, entry: ToolEntry) -> crate::types::Result<()> {
        if entry.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Get a tool entry by name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.get(name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All tool entries, sorted by name.
    pub fn list_entries(&self) -> Vec<&ToolEntry> {
        let mut entries: Vec<&ToolEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Validate parameters against a tool's parameter definitions.
    ///
    /// Returns a list of validation errors (empty = valid).
    pub fn validate_params(&self, name: &str, params: &Value) -> crate::types::Result<Vec<String>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", name)))?;

        let param_map = params
            .as_object()
            .ok_or_else(|| Error::validation("Tool arguments must be a JSON object"))?;

        let mut errors = Vec::new();

        for param_def in &entry.parameters {
            let present = param_map.keys().any(|key| param_def.matches(key));
            if param_def.is_required() && !present {
                errors.push(format!("Missing required parameter: {}", param_def.name));
            }
        }

        for (key, value) in param_map {
            match entry.parameters.iter().find(|p| p.matches(key)) {
                Some(param_def) => {
                    if let Err(e) = param_def.param_type.validate(value) {
                        errors.push(format!("Parameter '{}': {}", key, e));
                    }
                }
                None => errors.push(format!("Unknown parameter: {}", key)),
            }
        }

        Ok(errors)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
