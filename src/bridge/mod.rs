//! MCP Bridge
//!
//! The HTTP client for the remote tool-execution service and the
//! catalog built from its server/tool listings.

pub mod catalog;
pub mod client;

pub use catalog::{ServerTools, ToolCatalog};
pub use client::BridgeHttpClient;
