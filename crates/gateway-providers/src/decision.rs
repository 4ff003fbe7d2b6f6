//! Tool-decision interpretation dispatched by wire family.

use gateway_core::{ToolCallResult, WireFamily};
use serde_json::Value;

/// Read a raw upstream tool-mode response into a [`ToolCallResult`]
///
/// Returns `None` when the response carries neither text nor a call.
#[must_use]
pub fn interpret_decision(family: WireFamily, raw: &Value) -> Option<ToolCallResult> {
    match family {
        WireFamily::ChatCompletions => crate::openai::interpret_decision(raw),
        WireFamily::GenerateContent => crate::google::interpret_decision(raw),
    }
}
