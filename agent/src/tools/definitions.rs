//! Function-tool schemas advertised to the language model.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::illustration::IllustrationCatalog;

/// System instructions for the tutor persona.
pub const ASSISTANT_INSTRUCTIONS: &str = "\
You are Vyna, an AI tutor who explains mathematics the way a real teacher does.
Speak every symbol and number out loud in words.
Go straight into the material without small talk. Always answer in Indonesian.

Open with a short introduction and ask the student what they want to learn.
Keep each turn short, one or two sentences. You are speaking, so avoid formatting and complex symbols.

When a concept is easier to understand visually, call show_illustration to display a relevant image or diagram.
Call hide_illustration when you want to clear the illustration or move on to another topic.";

/// Tool definition for function calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionDefinition,
}

/// Function definition for tool calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Function description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema for parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl ToolDefinition {
    fn function(name: &str, description: String, parameters: serde_json::Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: Some(description),
                parameters: Some(parameters),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// A tool invocation produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID echoed back with the tool output
    pub call_id: String,
    /// Tool name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            call_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Result handed back to the model for a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub call_id: String,
    pub output: String,
}

fn show_illustration_description(catalog: &IllustrationCatalog) -> String {
    let mut description = String::from(
        "Show an illustration/image to the user. Use this when you want to display visual aids, \
         diagrams, or educational images.\n\nAvailable illustrations:",
    );
    for illustration in catalog.iter() {
        description.push_str(&format!(
            "\n- \"{}\": {} (topics: {})",
            illustration.key,
            illustration.description,
            illustration.topics.join(", ")
        ));
    }
    description.push_str(
        "\n\nPass illustration_key for a catalog entry, or image_url to show any other image.",
    );
    description
}

/// Schemas for every tool the assistant exposes.
pub fn tool_definitions(catalog: &IllustrationCatalog) -> Vec<ToolDefinition> {
    let keys: Vec<&str> = catalog.keys().collect();

    vec![
        ToolDefinition::function(
            "show_illustration",
            show_illustration_description(catalog),
            json!({
                "type": "object",
                "properties": {
                    "illustration_key": {
                        "type": "string",
                        "description": "The key of the illustration to display",
                        "enum": keys
                    },
                    "image_url": {
                        "type": "string",
                        "description": "Absolute http(s) URL of an image to display instead of a catalog entry"
                    }
                }
            }),
        ),
        ToolDefinition::function(
            "hide_illustration",
            "Hide the currently displayed illustration from the user. Use this when you want \
             to clear the visual display."
                .to_string(),
            json!({ "type": "object", "properties": {} }),
        ),
        ToolDefinition::function(
            "set_user_data",
            "Store the user's name and age in this session".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name of the user" },
                    "age": { "type": "integer", "minimum": 0, "description": "Age of the user" }
                },
                "required": ["name", "age"]
            }),
        ),
        ToolDefinition::function(
            "get_user_data",
            "Get the current session user name and age".to_string(),
            json!({ "type": "object", "properties": {} }),
        ),
        ToolDefinition::function(
            "create_component",
            "Create a component that stores text and display it to the user".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "The text to display" }
                },
                "required": ["content"]
            }),
        ),
        ToolDefinition::function(
            "toggle_component",
            "Toggle display of a component (show/hide)".to_string(),
            json!({
                "type": "object",
                "properties": {
                    "component_id": { "type": "string", "description": "The ID of the component to toggle" }
                },
                "required": ["component_id"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_defined() {
        let defs = tool_definitions(&IllustrationCatalog::default());
        let names: Vec<&str> = defs.iter().map(ToolDefinition::name).collect();
        assert_eq!(
            names,
            vec![
                "show_illustration",
                "hide_illustration",
                "set_user_data",
                "get_user_data",
                "create_component",
                "toggle_component"
            ]
        );
        assert!(defs.iter().all(|d| d.tool_type == "function"));
    }

    #[test]
    fn test_show_illustration_lists_catalog() {
        let defs = tool_definitions(&IllustrationCatalog::default());
        let show = &defs[0].function;

        let description = show.description.as_deref().unwrap();
        assert!(description.contains("\"pythagoras\""));
        assert!(description.contains("\"trigonometry\""));

        let params = show.parameters.as_ref().unwrap();
        assert_eq!(
            params["properties"]["illustration_key"]["enum"],
            json!(["pythagoras", "trigonometry"])
        );
    }

    #[test]
    fn test_definition_serializes_openai_shape() {
        let defs = tool_definitions(&IllustrationCatalog::default());
        let value = serde_json::to_value(&defs[1]).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "hide_illustration");
    }
}
