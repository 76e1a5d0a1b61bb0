//! Function declarations offered to the model.

use crate::ToolDefinition;

pub const RUN_CODE_TOOL: &str = "run_code";

/// The `run_code` declaration, offered when code execution is enabled.
/// Calls are never executed directly; the code is shown to the user, who
/// may run it through the simulated executor.
pub fn run_code_tool() -> ToolDefinition {
    ToolDefinition {
        name: RUN_CODE_TOOL.to_string(),
        description: "Run a snippet of code and return its output.".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "language": {
                    "type": "string",
                    "description": "Language of the snippet (python, javascript, bash, rust)"
                },
                "code": {
                    "type": "string",
                    "description": "The source code to run"
                }
            },
            "required": ["language", "code"]
        }),
    }
}

/// Convert a tool definition to the Gemini API format.
pub fn to_gemini_tool(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}
