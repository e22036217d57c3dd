//! Model-callable function tools.
//!
//! Every handler returns a plain reply string, including on failure, so a
//! broken frontend or an empty room never aborts the conversational turn.

pub mod definitions;
mod handlers;

pub use definitions::{
    ASSISTANT_INSTRUCTIONS, FunctionDefinition, ToolCall, ToolDefinition, ToolOutput,
    tool_definitions,
};
pub use handlers::{Assistant, COMPONENT_METHOD, ShowIllustrationArgs};
