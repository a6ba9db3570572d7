//! Response Parser
//!
//! Converts raw model text into a typed `AgentReply`. The model is
//! instructed to answer in JSON but routinely wraps it in fenced code
//! blocks or emits something else entirely; whatever happens, parsing
//! never fails. Malformed output becomes a degraded reply with no tool
//! call so the conversation can self-correct.

use regex::Regex;
use serde_json::Value;

use crate::types::{AgentReply, ToolCall};

/// Fallback message when the model's output cannot be parsed.
const PARSE_FAILURE_NOTICE: &str =
    "I couldn't format my response properly. Please try again with a clearer request.";

/// Parse raw model output into an `AgentReply`. Never fails.
pub fn parse_reply(raw: &str) -> AgentReply {
    let extracted = extract_payload(raw);

    let decoded: Value = match serde_json::from_str(&extracted) {
        Ok(v) => v,
        Err(_) => return degraded_reply(),
    };

    if !decoded.is_object() {
        return degraded_reply();
    }

    let message = decoded["response"].as_str().unwrap_or("").to_string();
    let tool_call = extract_tool_call(&decoded["tool_call"]);

    AgentReply { tool_call, message }
}

/// Extract the JSON payload from the raw text: a ```json fenced block
/// if present, else the content of any fenced block, else the trimmed
/// text verbatim.
fn extract_payload(raw: &str) -> String {
    extract_fenced(raw, r"(?s)```json\s*(.*?)```")
        .or_else(|| extract_fenced(raw, r"(?s)```\s*(.*?)```"))
        .unwrap_or_else(|| raw.trim().to_string())
}

fn extract_fenced(raw: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(raw).map(|caps| caps[1].trim().to_string())
}

/// Build a `ToolCall` only when server_id, tool_name, and parameters
/// are all present and non-null. Some-but-not-all populated fields are
/// deliberately treated as no call: the model is mid-thought, not
/// issuing a request.
fn extract_tool_call(value: &Value) -> Option<ToolCall> {
    let call = value.as_object()?;

    let server_id = call.get("server_id")?.as_str()?;
    let tool_name = call.get("tool_name")?.as_str()?;
    let parameters = call.get("parameters")?;
    if parameters.is_null() {
        return None;
    }

    Some(ToolCall {
        server_id: server_id.to_string(),
        tool_name: tool_name.to_string(),
        parameters: parameters.clone(),
    })
}

fn degraded_reply() -> AgentReply {
    AgentReply {
        tool_call: None,
        message: PARSE_FAILURE_NOTICE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_json_with_tool_call() {
        let raw = r#"{
            "tool_call": {
                "server_id": "fs",
                "tool_name": "read_file",
                "parameters": {"path": "/tmp/x"}
            },
            "response": "Reading the file."
        }"#;

        let reply = parse_reply(raw);
        assert_eq!(reply.message, "Reading the file.");
        let call = reply.tool_call.unwrap();
        assert_eq!(call.server_id, "fs");
        assert_eq!(call.tool_name, "read_file");
        assert_eq!(call.parameters, json!({"path": "/tmp/x"}));
    }

    #[test]
    fn test_parse_null_tool_call() {
        let raw = r#"{"tool_call": null, "response": "All done."}"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, "All done.");
    }

    #[test]
    fn test_parse_missing_tool_call_field() {
        let raw = r#"{"response": "Just chatting."}"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, "Just chatting.");
    }

    #[test]
    fn test_parse_missing_response_defaults_empty() {
        let raw = r#"{"tool_call": null}"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, "");
    }

    #[test]
    fn test_parse_fenced_json_with_surrounding_prose() {
        // Scenario: prose outside the fence is ignored entirely.
        let raw = "Here's what I'll do:\n```json\n{\"tool_call\": null, \"response\": \"ok\"}\n```\nLet me know!";
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, "ok");
    }

    #[test]
    fn test_parse_untagged_fence() {
        let raw = "```\n{\"tool_call\": null, \"response\": \"plain fence\"}\n```";
        let reply = parse_reply(raw);
        assert_eq!(reply.message, "plain fence");
    }

    #[test]
    fn test_parse_garbage_returns_degraded_reply() {
        let reply = parse_reply("I will now use the read_file tool, hold on...");
        assert!(reply.tool_call.is_none());
        assert!(!reply.message.is_empty());
        assert_eq!(reply.message, PARSE_FAILURE_NOTICE);
    }

    #[test]
    fn test_parse_non_object_returns_degraded_reply() {
        let reply = parse_reply(r#"["not", "an", "object"]"#);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, PARSE_FAILURE_NOTICE);
    }

    #[test]
    fn test_parse_empty_input_returns_degraded_reply() {
        let reply = parse_reply("");
        assert!(reply.tool_call.is_none());
        assert!(!reply.message.is_empty());
    }

    #[test]
    fn test_partial_tool_call_missing_server_id() {
        let raw = r#"{
            "tool_call": {"tool_name": "read_file", "parameters": {}},
            "response": "partial"
        }"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, "partial");
    }

    #[test]
    fn test_partial_tool_call_null_tool_name() {
        let raw = r#"{
            "tool_call": {"server_id": "fs", "tool_name": null, "parameters": {}},
            "response": "partial"
        }"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
    }

    #[test]
    fn test_partial_tool_call_null_parameters() {
        let raw = r#"{
            "tool_call": {"server_id": "fs", "tool_name": "read_file", "parameters": null},
            "response": "partial"
        }"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
    }

    #[test]
    fn test_tool_call_not_an_object() {
        let raw = r#"{"tool_call": "read_file", "response": "odd"}"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_none());
        assert_eq!(reply.message, "odd");
    }

    #[test]
    fn test_tagged_fence_preferred_over_untagged() {
        let raw = "```\nnot json\n```\n```json\n{\"tool_call\": null, \"response\": \"tagged\"}\n```";
        let reply = parse_reply(raw);
        assert_eq!(reply.message, "tagged");
    }

    #[test]
    fn test_parameters_may_be_any_json_value() {
        // The protocol asks for an object, but a non-null value still
        // counts as present; the bridge decides whether it's usable.
        let raw = r#"{
            "tool_call": {"server_id": "fs", "tool_name": "ls", "parameters": {}},
            "response": ""
        }"#;
        let reply = parse_reply(raw);
        assert!(reply.tool_call.is_some());
    }
}
