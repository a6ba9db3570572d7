//! Model Clients
//!
//! Implementations of the `ModelClient` collaborator.

pub mod gemini;

pub use gemini::GeminiClient;
