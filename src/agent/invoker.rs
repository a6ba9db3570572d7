//! Tool Invoker
//!
//! Executes a single tool call against the bridge and drives the
//! security-confirmation handshake when the bridge demands one. All
//! transport and API failures collapse into `Failure` outcomes; the
//! session never sees an error it has to abort on.

use serde_json::Value;

use crate::types::{BridgeClient, ConfirmationRequest, ExecutionOutcome, ToolCall};

/// Message reported when the user declines a confirmation.
const REJECTION_MESSAGE: &str = "User rejected the operation";

/// Execute one tool call. A result payload carrying
/// `requires_confirmation: true` is promoted to `ConfirmationRequired`
/// regardless of whatever else the payload contains; it is never a
/// success.
pub async fn invoke(bridge: &dyn BridgeClient, call: &ToolCall) -> ExecutionOutcome {
    match bridge.execute_tool(call).await {
        Ok(result) => {
            if result["requires_confirmation"].as_bool() == Some(true) {
                ExecutionOutcome::ConfirmationRequired(parse_confirmation(call, &result))
            } else {
                ExecutionOutcome::Success { result }
            }
        }
        Err(e) => ExecutionOutcome::Failure {
            error: e.to_string(),
        },
    }
}

/// Post the user's decision back to the bridge.
///
/// A `false` decision is recorded best-effort: the rejection stands
/// locally even when the bridge cannot be reached, since "rejected" is
/// the safe resolution. A `true` decision that fails at the transport
/// layer is a `Failure`; a resolution the bridge itself reports as
/// rejected (e.g. the confirmation expired) is `Rejected`.
pub async fn resolve_confirmation(
    bridge: &dyn BridgeClient,
    request: &ConfirmationRequest,
    confirmed: bool,
) -> ExecutionOutcome {
    if !confirmed {
        let _ = bridge
            .resolve_confirmation(&request.confirmation_id, false)
            .await;
        return ExecutionOutcome::Rejected {
            message: REJECTION_MESSAGE.to_string(),
        };
    }

    match bridge
        .resolve_confirmation(&request.confirmation_id, true)
        .await
    {
        Ok(result) => {
            if result["status"].as_str() == Some("rejected") {
                ExecutionOutcome::Rejected {
                    message: result["message"]
                        .as_str()
                        .unwrap_or("No reason provided")
                        .to_string(),
                }
            } else {
                ExecutionOutcome::Success { result }
            }
        }
        Err(e) => ExecutionOutcome::Failure {
            error: e.to_string(),
        },
    }
}

/// Pull the confirmation metadata out of the result payload. Missing
/// fields degrade to empty strings; only the ID is load-bearing.
fn parse_confirmation(call: &ToolCall, result: &Value) -> ConfirmationRequest {
    ConfirmationRequest {
        confirmation_id: result["confirmation_id"].as_str().unwrap_or("").to_string(),
        method: result["method"].as_str().unwrap_or("").to_string(),
        server_id: result["server_id"]
            .as_str()
            .unwrap_or(&call.server_id)
            .to_string(),
        tool_name: result["tool_name"]
            .as_str()
            .unwrap_or(&call.tool_name)
            .to_string(),
        risk_level: result["risk_level"].as_str().unwrap_or("unknown").to_string(),
        risk_description: result["risk_description"].as_str().unwrap_or("").to_string(),
        expires_at: result["expires_at"].as_str().unwrap_or("").to_string(),
    }
}
