//! Gemini Model Client
//!
//! Wraps the Gemini `generateContent` REST endpoint. The session
//! transcript is replayed on every call so the model keeps
//! conversational context without any server-side session state.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::AgentConfig;
use crate::types::{ModelClient, TranscriptTurn, TurnRole};

/// Model client for the Gemini API.
pub struct GeminiClient {
    api_url: String,
    api_key: String,
    model: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            api_url: config.gemini_api_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            http: Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    /// Send the transcript and return the model's raw text reply.
    async fn send(&self, turns: &[TranscriptTurn]) -> Result<String> {
        let contents: Vec<Value> = turns.iter().map(format_turn).collect();

        let body = serde_json::json!({ "contents": contents });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini error: {}: {}", status.as_u16(), text);
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let candidate = data["candidates"]
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("No candidate returned from Gemini"))?;

        let text = candidate["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}

/// Format one transcript turn into the Gemini `contents` structure.
/// Tool feedback is replayed as a user turn; the model only
/// distinguishes `user` and `model` roles.
fn format_turn(turn: &TranscriptTurn) -> Value {
    let role = match turn.role {
        TurnRole::Assistant => "model",
        TurnRole::User | TurnRole::ToolFeedback => "user",
    };

    serde_json::json!({
        "role": role,
        "parts": [{ "text": turn.text }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_turn_roles() {
        let assistant = format_turn(&TranscriptTurn {
            role: TurnRole::Assistant,
            text: "hello".to_string(),
        });
        assert_eq!(assistant["role"], "model");
        assert_eq!(assistant["parts"][0]["text"], "hello");

        let user = format_turn(&TranscriptTurn {
            role: TurnRole::User,
            text: "hi".to_string(),
        });
        assert_eq!(user["role"], "user");

        let feedback = format_turn(&TranscriptTurn {
            role: TurnRole::ToolFeedback,
            text: "result".to_string(),
        });
        assert_eq!(feedback["role"], "user");
    }
}
