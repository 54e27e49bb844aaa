//! Tool framework for agent-based execution
//!
//! Tools are described by a [`ToolDescriptor`] (rendered into the prompt) and
//! executed through the [`registry::ToolRegistry`], which validates arguments
//! against the declared [`ParameterSchema`] before dispatch.

pub mod builtin;
pub mod error;
pub mod registry;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use error::ToolError;

/// Result of tool execution
///
/// Success carries a tool-specific payload, failure a human-readable message.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Failure(String),
}

impl ToolResult {
    /// Create a successful result
    pub fn success(payload: Value) -> Self {
        Self::Success(payload)
    }

    /// Create a failed result
    pub fn error(error: impl Into<String>) -> Self {
        Self::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(msg) => Some(msg.as_str()),
        }
    }

    /// Wire form shown to the model
    ///
    /// Object payloads are flattened next to the `success` flag; any other
    /// payload goes under `result`.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        match self {
            Self::Success(payload) => {
                out.insert("success".to_string(), Value::Bool(true));
                match payload {
                    Value::Object(fields) => {
                        for (k, v) in fields {
                            if k != "success" {
                                out.insert(k.clone(), v.clone());
                            }
                        }
                    }
                    other => {
                        out.insert("result".to_string(), other.clone());
                    }
                }
            }
            Self::Failure(msg) => {
                out.insert("success".to_string(), Value::Bool(false));
                out.insert("error".to_string(), Value::String(msg.clone()));
            }
        }
        Value::Object(out)
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self::Failure(err.to_string())
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Context provided to tools during execution
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Directory holding the documents searched by `search_docs`
    pub docs_dir: PathBuf,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
        }
    }
}

impl ToolContext {
    /// Create a new context with the given documents directory
    pub fn new(docs_dir: PathBuf) -> Self {
        Self { docs_dir }
    }
}

/// Schema for a tool parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterProperty {
    /// Parameter type (string, number, integer, boolean, array, object)
    #[serde(rename = "type")]
    pub param_type: String,
    /// Parameter description
    pub description: String,
    /// Enum values if applicable
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Default value if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterProperty {
    fn of_type(param_type: &str, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.to_string(),
            description: description.into(),
            enum_values: None,
            default: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::of_type("string", description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::of_type("number", description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::of_type("integer", description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::of_type("boolean", description)
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Check a single argument value against this property
    fn check(&self, name: &str, value: &Value) -> Result<(), String> {
        let type_ok = match self.param_type.as_str() {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !type_ok {
            return Err(format!(
                "argument '{}' must be of type {}, got {}",
                name,
                self.param_type,
                json_type_name(value)
            ));
        }

        if let (Some(allowed), Some(s)) = (&self.enum_values, value.as_str()) {
            if !allowed.iter().any(|a| a == s) {
                return Err(format!(
                    "argument '{}' must be one of [{}], got '{}'",
                    name,
                    allowed.join(", "),
                    s
                ));
            }
        }

        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema describing tool parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    /// Type is always "object"
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Parameter properties
    pub properties: BTreeMap<String, ParameterProperty>,
    /// Required parameter names
    pub required: Vec<String>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, prop: ParameterProperty) -> Self {
        self.properties.insert(name.into(), prop);
        self
    }

    pub fn with_required(mut self, name: impl Into<String>, prop: ParameterProperty) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), prop);
        self.required.push(name);
        self
    }

    /// Validate call arguments, returning the argument map on success
    ///
    /// Rejects non-objects, missing required keys, unknown keys, wrong JSON
    /// types and values outside a declared enum.
    pub fn validate<'a>(&self, arguments: &'a Value) -> Result<&'a Map<String, Value>, String> {
        let map = match arguments {
            Value::Object(map) => map,
            other => {
                return Err(format!(
                    "arguments must be a JSON object, got {}",
                    json_type_name(other)
                ))
            }
        };

        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|name| map.get(name.as_str()).map_or(true, Value::is_null))
            .map(|name| name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(format!("missing required argument(s): {}", missing.join(", ")));
        }

        for (name, value) in map {
            if value.is_null() {
                // Optional parameter explicitly left unset
                continue;
            }
            match self.properties.get(name) {
                Some(prop) => prop.check(name, value)?,
                None => return Err(format!("unexpected argument '{}'", name)),
            }
        }

        Ok(map)
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable description of a registered tool, rendered into the prompt catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// Validated arguments handed to a tool
#[derive(Debug, Clone)]
pub struct ToolArgs {
    tool: String,
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(tool: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            values,
        }
    }

    /// Build from a JSON value, treating anything but an object as empty
    pub fn from_value(tool: impl Into<String>, value: Value) -> Self {
        let values = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(tool, values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// An `InvalidArguments` error for this tool
    pub fn invalid(&self, reason: impl Into<String>) -> ToolError {
        ToolError::InvalidArguments {
            tool: self.tool.clone(),
            reason: reason.into(),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ToolError> {
        self.optional_str(key)?
            .ok_or_else(|| self.invalid(format!("missing required argument '{}'", key)))
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.invalid(format!("argument '{}' must be a string", key))),
        }
    }

    pub fn require_number(&self, key: &str) -> Result<&Number, ToolError> {
        match self.get(key) {
            Some(Value::Number(n)) => Ok(n),
            Some(_) => Err(self.invalid(format!("argument '{}' must be a number", key))),
            None => Err(self.invalid(format!("missing required argument '{}'", key))),
        }
    }

    pub fn optional_u64(&self, key: &str) -> Result<Option<u64>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                self.invalid(format!("argument '{}' must be a non-negative integer", key))
            }),
        }
    }
}

/// The Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get a description of what the tool does
    fn description(&self) -> &str;

    /// Get the parameter schema
    fn parameters_schema(&self) -> ParameterSchema;

    /// Execute the tool with the given arguments
    ///
    /// Domain failures (bad input values, nothing to fetch) are returned as
    /// `Ok(ToolResult::Failure)`; argument-shape problems and I/O faults as
    /// `Err`.
    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<ToolResult, ToolError>;

    /// Convert to a descriptor for the prompt catalog
    fn to_descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
