//! The Agent
//!
//! Orchestration core: response parsing, tool invocation, the session
//! transcript, and the loop that drives them.

pub mod agent_loop;
pub mod invoker;
pub mod parser;
pub mod system_prompt;
pub mod transcript;

pub use agent_loop::{
    start_session, Session, SessionEvent, SessionOptions, StartupSummary, UtteranceResult,
};
pub use transcript::Transcript;
