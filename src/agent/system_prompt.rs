//! System Instruction Builder
//!
//! Assembles the instruction that teaches the model the JSON reply
//! protocol and describes every tool the bridge exposes. The catalog
//! description is rendered deterministically, so an unchanged bridge
//! yields a byte-identical instruction on every run.

use crate::bridge::ToolCatalog;

/// The JSON reply contract the model must follow on every turn.
pub const REPLY_PROTOCOL: &str = r#"You are an AI assistant that uses available MCP tools to help users accomplish tasks.
When responding, you must ALWAYS return answers in the following JSON format:
{
  "tool_call": {
    "server_id": "string or null",
    "tool_name": "string or null",
    "parameters": {} or null
  },
  "response": "string"
}

If you need to use a tool, fill in the server_id, tool_name, and parameters fields.
If you don't need to use a tool, set server_id, tool_name, and parameters to null.

Your response field should always contain your message to the user."#;

/// Guidance for multi-step reasoning and file operations.
pub const USAGE_GUIDANCE: &str = r#"When a user asks for something that requires using these tools:
1. Figure out which tool is most appropriate
2. Format a proper JSON response with the tool_call filled in
3. Make your response helpful and conversational

When you receive feedback about a tool execution:
1. If you need to make another tool call based on the previous result, include it in your tool_call
2. If no more calls are needed, set server_id, tool_name, and parameters to null
3. Provide a helpful message about the final result in the response field

For file operations:
1. Always check allowed directories first using list_allowed_directories
2. Create files and directories only within allowed directories
3. Provide clear feedback about what you're doing at each step"#;

/// Briefing on the security-confirmation handshake.
pub const CONFIRMATION_BRIEFING: &str = r#"IMPORTANT: Some tool operations may require user confirmation for security reasons.
If a tool execution returns a result containing "requires_confirmation": true, you should:
1. Inform the user that confirmation is required
2. Explain the risk level and what operation needs confirmation
3. Ask them to explicitly confirm if they want to proceed"#;

/// Build the complete system instruction for a session.
pub fn build_system_instruction(catalog: &ToolCatalog) -> String {
    format!(
        "{}\n\nHere's information about all the tools you can use:\n\n{}\n{}\n\n{}",
        REPLY_PROTOCOL,
        catalog.describe(),
        USAGE_GUIDANCE,
        CONFIRMATION_BRIEFING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ServerTools;
    use crate::types::Tool;

    fn catalog() -> ToolCatalog {
        ToolCatalog::from_servers(vec![ServerTools {
            server_id: "fs".to_string(),
            tools: vec![Tool {
                server_id: "fs".to_string(),
                name: "list_allowed_directories".to_string(),
                description: "List directories the server may access".to_string(),
                parameters: vec![],
            }],
        }])
    }

    #[test]
    fn test_instruction_contains_protocol_and_catalog() {
        let instruction = build_system_instruction(&catalog());
        assert!(instruction.contains("\"tool_call\""));
        assert!(instruction.contains("## Server: fs"));
        assert!(instruction.contains("### list_allowed_directories"));
        assert!(instruction.contains("requires_confirmation"));
    }

    #[test]
    fn test_instruction_is_reproducible() {
        assert_eq!(
            build_system_instruction(&catalog()),
            build_system_instruction(&catalog())
        );
    }
}
