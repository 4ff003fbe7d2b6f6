//! Fixed tool catalog offered to callers.
//!
//! One strict declaration per supported document action plus two control
//! actions. Built once on first use and never mutated.

use crate::tool_schema::to_native_tool_set;
use gateway_core::{NativeToolSet, ToolDeclaration};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static CATALOG: Lazy<Vec<ToolDeclaration>> = Lazy::new(build_catalog);

/// The canonical catalog, in presentation order
#[must_use]
pub fn tool_catalog() -> &'static [ToolDeclaration] {
    &CATALOG
}

/// The catalog converted to the generate-content wrapper
#[must_use]
pub fn native_tool_catalog() -> NativeToolSet {
    to_native_tool_set(tool_catalog())
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn range_schema() -> Value {
    let mut range = object(
        json!({
            "start": {"type": "integer", "description": "Zero-based start offset"},
            "end": {"type": "integer", "description": "Exclusive end offset"}
        }),
        &["start", "end"],
    );
    range["description"] = json!("Character range in the document");
    range
}

fn build_catalog() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration::function(
            "insert_text",
            "Insert text at the cursor or at a given position",
            object(
                json!({
                    "text": {"type": "string", "description": "Text to insert"},
                    "position": {
                        "type": "string",
                        "enum": ["cursor", "start", "end"],
                        "description": "Where to insert the text"
                    }
                }),
                &["text", "position"],
            ),
        ),
        ToolDeclaration::function(
            "replace_selection",
            "Replace the currently selected text",
            object(
                json!({"text": {"type": "string", "description": "Replacement text"}}),
                &["text"],
            ),
        ),
        ToolDeclaration::function(
            "format_text",
            "Apply a formatting style to a range of text",
            object(
                json!({
                    "style": {
                        "type": "string",
                        "enum": ["bold", "italic", "underline", "strikethrough", "heading1", "heading2", "code"]
                    },
                    "range": range_schema()
                }),
                &["style", "range"],
            ),
        ),
        ToolDeclaration::function(
            "insert_table",
            "Insert a table at the cursor",
            object(
                json!({
                    "rows": {"type": "integer", "description": "Number of body rows"},
                    "columns": {"type": "integer", "description": "Number of columns"},
                    "header": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Column titles, one per column"
                    }
                }),
                &["rows", "columns", "header"],
            ),
        ),
        ToolDeclaration::function(
            "add_comment",
            "Attach a review comment to a range of text",
            object(
                json!({
                    "comment": {"type": "string"},
                    "range": range_schema()
                }),
                &["comment", "range"],
            ),
        ),
        ToolDeclaration::function(
            "ask_clarification",
            "Ask the user a question when the request is ambiguous",
            object(json!({"question": {"type": "string"}}), &["question"]),
        ),
        ToolDeclaration::function(
            "no_action",
            "Decline to edit the document",
            object(
                json!({"reason": {"type": "string", "description": "Why nothing was done"}}),
                &["reason"],
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_satisfies_strict_contract() {
        for tool in tool_catalog() {
            tool.validate()
                .unwrap_or_else(|e| panic!("{} is invalid: {e}", tool.name()));
        }
    }

    #[test]
    fn test_catalog_names_unique() {
        let names: HashSet<_> = tool_catalog().iter().map(ToolDeclaration::name).collect();
        assert_eq!(names.len(), tool_catalog().len());
        assert!(names.contains("no_action"));
        assert!(names.contains("ask_clarification"));
    }

    #[test]
    fn test_native_catalog_matches_order() {
        let native = native_tool_catalog();
        let canonical: Vec<_> = tool_catalog().iter().map(ToolDeclaration::name).collect();
        let converted: Vec<_> = native
            .function_declarations
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(canonical, converted);
        assert_eq!(
            native.function_declarations[2].parameters["properties"]["range"]["type"],
            "OBJECT"
        );
    }
}
