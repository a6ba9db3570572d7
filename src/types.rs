//! Emissary - Type Definitions
//!
//! Shared types for the bridge agent: the tool data model, the
//! execution outcome variants, the session transcript turns, and the
//! collaborator traits the orchestration loop is written against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Tool Catalog ────────────────────────────────────────────────

/// A single parameter accepted by a tool, as advertised by the bridge.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

/// A tool exposed by one of the bridge's servers. Immutable once
/// fetched; the catalog is rebuilt once per session at startup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tool {
    pub server_id: String,
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

// ─── Model Replies ───────────────────────────────────────────────

/// A structured tool invocation request emitted by the model.
///
/// The parser only constructs one when `server_id`, `tool_name`, and
/// `parameters` are all present and non-null; a partially populated
/// wire object is treated as no call at all.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub server_id: String,
    pub tool_name: String,
    pub parameters: Value,
}

/// One parsed model turn: an optional tool call plus the message text
/// intended for the user.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentReply {
    pub tool_call: Option<ToolCall>,
    pub message: String,
}

// ─── Execution Outcomes ──────────────────────────────────────────

/// Confirmation metadata the bridge attaches when a risky operation
/// needs an explicit user decision before it runs.
///
/// `expires_at` is surfaced for display only; the bridge is the
/// authority on expiry and the invoker never rejects on elapsed time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub confirmation_id: String,
    pub method: String,
    pub server_id: String,
    pub tool_name: String,
    pub risk_level: String,
    pub risk_description: String,
    pub expires_at: String,
}

/// The resolved state of a single tool invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionOutcome {
    Success { result: Value },
    Failure { error: String },
    ConfirmationRequired(ConfirmationRequest),
    Rejected { message: String },
}

// ─── Session Transcript ──────────────────────────────────────────

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
    ToolFeedback,
}

/// One ordered entry in the session transcript.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptTurn {
    pub role: TurnRole,
    pub text: String,
}

// ─── Collaborator Traits ─────────────────────────────────────────

/// Errors at the bridge seam. Transport failures and bridge-reported
/// API errors stay distinguishable until the caller collapses them.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge request failed: {0}")]
    Transport(String),
    #[error("bridge error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// The remote tool-execution service.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// `GET /health` readiness check. Returns the bridge's server count.
    async fn health(&self) -> Result<u64, BridgeError>;

    /// `GET /servers` -> ordered server IDs as the bridge lists them.
    async fn list_servers(&self) -> Result<Vec<String>, BridgeError>;

    /// `GET /servers/{id}/tools` -> normalized tools for one server.
    async fn list_tools(&self, server_id: &str) -> Result<Vec<Tool>, BridgeError>;

    /// `POST /servers/{id}/tools/{name}` -> raw tool result JSON.
    async fn execute_tool(&self, call: &ToolCall) -> Result<Value, BridgeError>;

    /// `POST /confirmations/{id}` with the user's decision.
    async fn resolve_confirmation(
        &self,
        confirmation_id: &str,
        confirm: bool,
    ) -> Result<Value, BridgeError>;
}

/// The language model. The loop treats its output as inherently
/// unstructured text and parses it defensively.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the accumulated transcript and return the model's raw text.
    async fn send(&self, turns: &[TranscriptTurn]) -> anyhow::Result<String>;
}

/// Obtains the user's decision for a security confirmation.
/// Implementations must default to `false` when no explicit input is given.
pub trait ConfirmationGate: Send + Sync {
    fn decide(&self, request: &ConfirmationRequest) -> bool;
}
