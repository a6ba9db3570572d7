//! The Session Loop
//!
//! The orchestration core: given one user utterance, repeatedly ask
//! the model for its next step, execute requested tool calls against
//! the bridge, and fold the results back into the transcript until the
//! model answers without a tool call.
//!
//! Per utterance the loop walks AwaitingModel -> HasReply -> (Done |
//! AwaitingToolResult) -> AwaitingModel -> ... -> Done. Nothing that
//! happens mid-loop is fatal to the session; degraded replies and tool
//! failures become ordinary feedback the model can react to. The only
//! fatal conditions are the startup checks in [`start_session`].

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::bridge::ToolCatalog;
use crate::types::{
    BridgeClient, ConfirmationGate, ConfirmationRequest, ExecutionOutcome, ModelClient,
    ToolCall, TurnRole,
};

use super::invoker;
use super::parser::parse_reply;
use super::system_prompt::build_system_instruction;
use super::transcript::Transcript;

/// Observable moments in a session, for rendering by the caller. The
/// loop itself never prints.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The model produced a message for the user.
    AssistantMessage(String),
    /// A tool call is about to be executed.
    ExecutingTool(ToolCall),
    /// The bridge demanded a confirmation; a decision is being obtained.
    ConfirmationRequested(ConfirmationRequest),
    /// A tool call resolved.
    ToolResolved {
        tool_name: String,
        outcome: ExecutionOutcome,
    },
}

/// Callback invoked for every session event.
pub type EventCallback = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Collaborators and settings for one interactive session.
pub struct SessionOptions {
    pub model: Box<dyn ModelClient>,
    pub bridge: Box<dyn BridgeClient>,
    pub gate: Box<dyn ConfirmationGate>,
    /// Cap on tool executions per utterance; `None` means uncapped.
    pub max_steps: Option<usize>,
    pub on_event: Option<EventCallback>,
}

/// How one utterance ended.
#[derive(Clone, Debug, PartialEq)]
pub enum UtteranceResult {
    /// The model answered without requesting another tool call.
    Answered(String),
    /// The configured step cap was hit; the pending call was not executed.
    StepLimitExceeded { executed: usize, message: String },
}

/// What the startup checks discovered.
#[derive(Clone, Debug)]
pub struct StartupSummary {
    /// Server count reported by the bridge health endpoint.
    pub server_count: u64,
    pub discovered_servers: usize,
    pub discovered_tools: usize,
}

/// One interactive session: the transcript plus its collaborators.
pub struct Session {
    model: Box<dyn ModelClient>,
    bridge: Box<dyn BridgeClient>,
    gate: Box<dyn ConfirmationGate>,
    max_steps: Option<usize>,
    on_event: Option<EventCallback>,
    transcript: Transcript,
}

/// Run the startup checks and build a ready session.
///
/// Failing to reach the bridge is fatal here, before any model call is
/// made or transcript entry created. The catalog fetch itself fails
/// soft; an empty catalog only warns.
pub async fn start_session(options: SessionOptions) -> Result<(Session, StartupSummary)> {
    let server_count = options
        .bridge
        .health()
        .await
        .context("Cannot reach MCP bridge")?;

    let catalog = ToolCatalog::fetch(options.bridge.as_ref()).await;
    if catalog.is_empty() {
        warn!("No tools found from any server");
    }

    let summary = StartupSummary {
        server_count,
        discovered_servers: catalog.server_count(),
        discovered_tools: catalog.tool_count(),
    };

    let instruction = build_system_instruction(&catalog);
    Ok((Session::new(options, instruction), summary))
}

impl Session {
    /// Build a session with the system instruction seeded as the first
    /// conversational turn, so prompts are reproducible per catalog.
    pub fn new(options: SessionOptions, system_instruction: String) -> Self {
        let SessionOptions {
            model,
            bridge,
            gate,
            max_steps,
            on_event,
        } = options;

        let mut transcript = Transcript::new();
        transcript.append(TurnRole::User, system_instruction);

        Self {
            model,
            bridge,
            gate,
            max_steps,
            on_event,
            transcript,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Resolve one user utterance, including all chained tool calls
    /// and confirmations, and return how it ended.
    pub async fn run_utterance(&mut self, input: &str) -> UtteranceResult {
        self.transcript.append(TurnRole::User, input);
        let mut executed: usize = 0;

        loop {
            // AwaitingModel
            let raw = match self.model.send(self.transcript.as_context()).await {
                Ok(text) => text,
                Err(e) => {
                    // The model itself is unreachable, so there is no
                    // point feeding the failure back to it. End the
                    // utterance with a degraded message; the session
                    // stays usable.
                    warn!("Model request failed: {}", e);
                    let message = format!("The model request failed: {}", e);
                    self.emit(SessionEvent::AssistantMessage(message.clone()));
                    return UtteranceResult::Answered(message);
                }
            };
            self.transcript.append(TurnRole::Assistant, raw.clone());

            // HasReply
            let reply = parse_reply(&raw);
            self.emit(SessionEvent::AssistantMessage(reply.message.clone()));

            let Some(call) = reply.tool_call else {
                // Done
                return UtteranceResult::Answered(reply.message);
            };

            if let Some(cap) = self.max_steps {
                if executed >= cap {
                    warn!(
                        "Step cap of {} reached; not executing {}/{}",
                        cap, call.server_id, call.tool_name
                    );
                    return UtteranceResult::StepLimitExceeded {
                        executed,
                        message: reply.message,
                    };
                }
            }

            // AwaitingToolResult
            info!("Executing tool {}/{}", call.server_id, call.tool_name);
            self.emit(SessionEvent::ExecutingTool(call.clone()));

            let mut outcome = invoker::invoke(self.bridge.as_ref(), &call).await;
            executed += 1;

            if let ExecutionOutcome::ConfirmationRequired(request) = outcome {
                self.emit(SessionEvent::ConfirmationRequested(request.clone()));
                let decision = self.gate.decide(&request);
                outcome =
                    invoker::resolve_confirmation(self.bridge.as_ref(), &request, decision).await;
            }

            self.emit(SessionEvent::ToolResolved {
                tool_name: call.tool_name.clone(),
                outcome: outcome.clone(),
            });

            let feedback = feedback_text(&call, &outcome);
            self.transcript.append(TurnRole::ToolFeedback, feedback);
            // back to AwaitingModel
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(ref cb) = self.on_event {
            cb(&event);
        }
    }
}

/// Summarize an outcome as the feedback string the model sees next.
fn feedback_text(call: &ToolCall, outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Success { result } => {
            let result_str = serde_json::to_string_pretty(result)
                .unwrap_or_else(|_| result.to_string());
            format!(
                "The tool {} was executed successfully. Result: {}",
                call.tool_name, result_str
            )
        }
        ExecutionOutcome::Failure { error } => {
            format!("The tool execution failed with error: {}", error)
        }
        ExecutionOutcome::Rejected { message } => {
            format!("The operation was cancelled by the user: {}", message)
        }
        // Confirmations are resolved before feedback is built; this
        // arm only matters if that invariant is ever broken upstream.
        ExecutionOutcome::ConfirmationRequired(_) => {
            format!("The tool {} is awaiting user confirmation.", call.tool_name)
        }
    }
}
