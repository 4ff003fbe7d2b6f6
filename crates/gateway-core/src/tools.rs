//! Tool declarations and tool-call decisions.
//!
//! The canonical declaration is the OpenAI function-calling shape with
//! `strict: true`. Every object schema inside its parameter tree must carry
//! `additionalProperties: false`; [`ToolDeclaration::validate`] enforces this.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical tool declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Tool type, always `"function"`
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionDeclaration,
}

/// Function half of a canonical tool declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does
    #[serde(default)]
    pub description: String,
    /// JSON-Schema parameter tree with an `object` root
    pub parameters: Value,
    /// Strict schema adherence flag
    #[serde(default)]
    pub strict: bool,
}

impl ToolDeclaration {
    /// Create a strict function declaration
    #[must_use]
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDeclaration {
                name: name.into(),
                description: description.into(),
                parameters,
                strict: true,
            },
        }
    }

    /// Function name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Check the strict-schema contract
    ///
    /// # Errors
    /// Returns a validation error naming the first offending path
    pub fn validate(&self) -> Result<(), GatewayError> {
        let name = &self.function.name;
        if name.trim().is_empty() {
            return Err(GatewayError::validation(
                "tool declaration name cannot be empty",
                Some("tools"),
            ));
        }
        if self.tool_type != "function" {
            return Err(GatewayError::validation(
                format!("tool '{name}' has unsupported type '{}'", self.tool_type),
                Some("tools"),
            ));
        }
        if !self.function.strict {
            return Err(GatewayError::validation(
                format!("tool '{name}' must set strict = true"),
                Some("tools"),
            ));
        }

        let root = self.function.parameters.as_object().ok_or_else(|| {
            GatewayError::validation(
                format!("tool '{name}' parameters must be a JSON object"),
                Some("tools"),
            )
        })?;
        if root.get("type").and_then(Value::as_str) != Some("object") {
            return Err(GatewayError::validation(
                format!("tool '{name}' parameters must have an object root"),
                Some("tools"),
            ));
        }

        check_closed_objects(root, name, "parameters")
    }
}

fn check_closed_objects(
    schema: &Map<String, Value>,
    tool: &str,
    path: &str,
) -> Result<(), GatewayError> {
    let is_object = schema.get("type").and_then(Value::as_str) == Some("object")
        || schema.contains_key("properties");
    if is_object && schema.get("additionalProperties") != Some(&Value::Bool(false)) {
        return Err(GatewayError::validation(
            format!("tool '{tool}' schema at '{path}' must set additionalProperties = false"),
            Some("tools"),
        ));
    }

    if let Some(Value::Object(properties)) = schema.get("properties") {
        for (key, child) in properties {
            if let Value::Object(child) = child {
                check_closed_objects(child, tool, &format!("{path}.{key}"))?;
            }
        }
    }
    match schema.get("items") {
        Some(Value::Object(items)) => check_closed_objects(items, tool, &format!("{path}[]"))?,
        Some(Value::Array(items)) => {
            for item in items.iter().filter_map(Value::as_object) {
                check_closed_objects(item, tool, &format!("{path}[]"))?;
            }
        }
        _ => {}
    }
    for combinator in ["anyOf", "oneOf", "allOf"] {
        if let Some(Value::Array(variants)) = schema.get(combinator) {
            for variant in variants.iter().filter_map(Value::as_object) {
                check_closed_objects(variant, tool, &format!("{path}.{combinator}"))?;
            }
        }
    }
    Ok(())
}

/// Provider-native function declaration (generate-content family)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeFunctionDeclaration {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// Parameter schema with upper-cased types and no strictness keys
    pub parameters: Value,
}

/// Wrapper holding one native declaration list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeToolSet {
    /// Declarations in caller order; `declarations` is accepted on input
    #[serde(alias = "declarations")]
    pub function_declarations: Vec<NativeFunctionDeclaration>,
}

/// The envelope's `tools` field: canonical list or an already-native wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolsField {
    /// Canonical declarations
    Canonical(Vec<ToolDeclaration>),
    /// Native generate-content wrapper, `{"functionDeclarations": [...]}`.
    ///
    /// The bare `{"declarations": [...]}` wrapper decodes to the same variant
    /// and is always re-emitted as `functionDeclarations`.
    Native(NativeToolSet),
}

impl ToolsField {
    /// Number of declarations carried
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Canonical(tools) => tools.len(),
            Self::Native(set) => set.function_declarations.len(),
        }
    }

    /// Whether no declaration is carried
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interpreted tool-mode decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolCallResult {
    /// The model answered with prose
    Text {
        /// Answer text
        text: String,
    },
    /// The model chose a tool
    Invocation {
        /// Tool name
        name: String,
        /// Parsed arguments
        arguments: Value,
    },
}
