//! Emissary -- MCP Bridge Chat Agent
//!
//! A conversational agent that connects the Gemini model to a remote
//! MCP bridge: the model requests tool calls, the bridge executes them
//! (with a security-confirmation handshake for risky operations), and
//! results feed back into the conversation until the task is done.

pub mod types;
pub mod config;
pub mod agent;
pub mod bridge;
pub mod model;
pub mod console;
