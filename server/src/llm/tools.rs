//! Output tools for schema-checked generation.
//!
//! A flow declares its output record as a tool whose input schema is that
//! record; the model is forced to call it, and the call's input is the
//! structured answer.

use super::types::Tool;

/// A string field of an output record.
#[derive(Debug, Clone, Copy)]
pub struct OutputField {
    pub name: &'static str,
    pub description: &'static str,
}

/// Build an object-schema tool whose properties are all required strings.
#[must_use]
pub fn output_tool(name: &str, description: &str, fields: &[OutputField]) -> Tool {
    let properties: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|f| {
            (f.name.to_string(), serde_json::json!({ "type": "string", "description": f.description }))
        })
        .collect();
    let required: Vec<&str> = fields.iter().map(|f| f.name).collect();

    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
