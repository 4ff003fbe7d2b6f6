//! Tool schema adapter.
//!
//! Pure translation from canonical tool declarations into each wire family's
//! native declaration format. For the generate-content family:
//! - `type` strings are upper-cased (`object` becomes `OBJECT`)
//! - `strict` and `additionalProperties` are removed at every depth
//! - `enum` lists, `required` lists and declaration order are preserved

use gateway_core::{NativeFunctionDeclaration, NativeToolSet, ToolDeclaration, WireFamily};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys the generate-content family rejects
const STRIPPED_KEYS: [&str; 2] = ["strict", "additionalProperties"];

/// Keys whose value is a single sub-schema
const SCHEMA_KEYS: [&str; 8] = [
    "items",
    "not",
    "additionalItems",
    "contains",
    "propertyNames",
    "if",
    "then",
    "else",
];

/// Keys whose value is a list of sub-schemas
const SCHEMA_LIST_KEYS: [&str; 4] = ["anyOf", "oneOf", "allOf", "prefixItems"];

/// Keys whose value maps names or patterns to sub-schemas
const SCHEMA_MAP_KEYS: [&str; 5] = [
    "properties",
    "$defs",
    "definitions",
    "patternProperties",
    "dependentSchemas",
];

/// Tool declarations in a provider's own format
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderTools {
    /// Canonical list, unchanged
    ChatCompletions(Vec<ToolDeclaration>),
    /// Single wrapper with one declaration list
    GenerateContent(NativeToolSet),
}

impl ProviderTools {
    /// Number of declarations
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::ChatCompletions(tools) => tools.len(),
            Self::GenerateContent(set) => set.function_declarations.len(),
        }
    }

    /// Whether there are no declarations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Translate canonical declarations for the given wire family
#[must_use]
pub fn to_provider_schema(canonical: &[ToolDeclaration], family: WireFamily) -> ProviderTools {
    match family {
        WireFamily::ChatCompletions => ProviderTools::ChatCompletions(canonical.to_vec()),
        WireFamily::GenerateContent => ProviderTools::GenerateContent(to_native_tool_set(canonical)),
    }
}

/// Translate canonical declarations into the generate-content wrapper
#[must_use]
pub fn to_native_tool_set(canonical: &[ToolDeclaration]) -> NativeToolSet {
    NativeToolSet {
        function_declarations: canonical.iter().map(to_native_declaration).collect(),
    }
}

/// Translate one canonical declaration
#[must_use]
pub fn to_native_declaration(tool: &ToolDeclaration) -> NativeFunctionDeclaration {
    NativeFunctionDeclaration {
        name: tool.function.name.clone(),
        description: tool.function.description.clone(),
        parameters: to_native_schema(&tool.function.parameters),
    }
}

/// Translate one parameter schema node
#[must_use]
pub fn to_native_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(node) => Value::Object(native_node(node)),
        other => other.clone(),
    }
}

fn native_node(node: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(node.len());

    for (key, value) in node {
        let key_str = key.as_str();
        if STRIPPED_KEYS.contains(&key_str) {
            continue;
        }

        let converted = if key_str == "type" {
            upper_case_type(value)
        } else if SCHEMA_MAP_KEYS.contains(&key_str) {
            match value {
                // Property names are data, only their schemas are converted.
                Value::Object(children) => Value::Object(
                    children
                        .iter()
                        .map(|(name, child)| (name.clone(), to_native_schema(child)))
                        .collect(),
                ),
                other => other.clone(),
            }
        } else if SCHEMA_KEYS.contains(&key_str) {
            match value {
                Value::Array(tuple) => Value::Array(tuple.iter().map(to_native_schema).collect()),
                other => to_native_schema(other),
            }
        } else if SCHEMA_LIST_KEYS.contains(&key_str) {
            match value {
                Value::Array(variants) => {
                    Value::Array(variants.iter().map(to_native_schema).collect())
                }
                other => other.clone(),
            }
        } else {
            // enum, required, description, default, ... pass through untouched
            value.clone()
        };

        out.insert(key.clone(), converted);
    }

    out
}

fn upper_case_type(value: &Value) -> Value {
    match value {
        Value::String(name) => Value::String(name.to_uppercase()),
        Value::Array(names) => Value::Array(
            names
                .iter()
                .map(|name| match name {
                    Value::String(s) => Value::String(s.to_uppercase()),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
