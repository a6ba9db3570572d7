//! Console Rendering
//!
//! Terminal output for the interactive session: colored status lines,
//! width-aware JSON formatting, and the security-confirmation prompt.
//! The session loop never touches the terminal; everything here hangs
//! off the event callback installed in `main`.

use colored::Colorize;
use dialoguer::Confirm;
use serde_json::Value;

use crate::agent::SessionEvent;
use crate::types::{ConfirmationGate, ConfirmationRequest, ExecutionOutcome};

/// Display settings carried from the CLI surface, uninterpreted.
#[derive(Clone, Copy, Debug)]
pub struct DisplayOptions {
    pub show_json: bool,
    pub max_width: usize,
}

/// Format a JSON result for display. Pretty-printed with two-space
/// indentation; compacted to one-space when any line would exceed
/// `max_width`. Hidden entirely when `show_json` is off.
pub fn format_json_result(result: &Value, show_json: bool, max_width: usize) -> String {
    if !show_json {
        return "<JSON result hidden>".to_string();
    }

    let formatted = serde_json::to_string_pretty(result)
        .unwrap_or_else(|_| result.to_string());

    if formatted.lines().any(|line| line.len() > max_width) {
        serde_json::to_string(result).unwrap_or(formatted)
    } else {
        formatted
    }
}

/// Render one session event to the terminal.
pub fn render_event(event: &SessionEvent, display: DisplayOptions) {
    match event {
        SessionEvent::AssistantMessage(message) => {
            if !message.is_empty() {
                println!("\n{}", "AI:".bold());
                println!("{}", message);
            }
        }
        SessionEvent::ExecutingTool(call) => {
            if display.show_json {
                println!(
                    "\n{} {}/{}",
                    "Executing tool:".yellow().bold(),
                    call.server_id,
                    call.tool_name
                );
                println!("{}", "Parameters:".bold());
                println!(
                    "{}",
                    format_json_result(&call.parameters, true, display.max_width)
                );
            } else {
                println!(
                    "\n{} {}/{} (parameters hidden)",
                    "Executing tool:".yellow().bold(),
                    call.server_id,
                    call.tool_name
                );
            }
        }
        SessionEvent::ConfirmationRequested(_) => {
            println!(
                "{}",
                "Operation requires security confirmation".yellow().bold()
            );
        }
        SessionEvent::ToolResolved { outcome, .. } => render_outcome(outcome, display),
    }
}

fn render_outcome(outcome: &ExecutionOutcome, display: DisplayOptions) {
    match outcome {
        ExecutionOutcome::Success { result } => {
            println!("{}", "Tool execution successful".green().bold());
            println!("{}", "Result:".bold());
            println!(
                "{}",
                format_json_result(result, display.show_json, display.max_width)
            );
        }
        ExecutionOutcome::Failure { error } => {
            println!("{} {}", "Tool execution failed:".red().bold(), error);
        }
        ExecutionOutcome::Rejected { message } => {
            println!("{} {}", "Operation rejected:".yellow().bold(), message);
        }
        ExecutionOutcome::ConfirmationRequired(_) => {}
    }
}

/// Interactive confirmation gate backed by a terminal prompt.
/// Defaults to "do not proceed"; a failed prompt is a `false`.
pub struct ConsoleGate;

impl ConfirmationGate for ConsoleGate {
    fn decide(&self, request: &ConfirmationRequest) -> bool {
        println!();
        println!("{}", "⚠ Security Confirmation Required".yellow().bold());
        println!(
            "Operation: {} on server {}",
            request.method.bold(),
            request.server_id.bold()
        );
        println!("Tool: {}", request.tool_name.bold());
        println!(
            "Risk Level: {} ({})",
            request.risk_level.bold(),
            request.risk_description
        );
        if !request.expires_at.is_empty() {
            // Display only; the bridge is the authority on expiry.
            let expires = chrono::DateTime::parse_from_rfc3339(&request.expires_at)
                .map(|t| t.with_timezone(&chrono::Local).to_rfc2822())
                .unwrap_or_else(|_| request.expires_at.clone());
            println!("Expires: {}", expires);
        }
        println!("This operation requires explicit confirmation for security reasons.");

        Confirm::new()
            .with_prompt("Do you want to proceed with this operation?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_json_hidden() {
        let result = json!({"a": 1});
        assert_eq!(
            format_json_result(&result, false, 100),
            "<JSON result hidden>"
        );
    }

    #[test]
    fn test_format_json_pretty_within_width() {
        let result = json!({"dirs": ["/tmp"]});
        let formatted = format_json_result(&result, true, 100);
        assert!(formatted.contains('\n'));
        assert!(formatted.contains("\"dirs\""));
    }

    #[test]
    fn test_format_json_compacts_wide_output() {
        let long = "x".repeat(200);
        let result = json!({ "value": long });
        let formatted = format_json_result(&result, true, 100);
        // Compact form: a single line.
        assert_eq!(formatted.lines().count(), 1);
    }
}
