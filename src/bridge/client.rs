//! MCP Bridge HTTP Client
//!
//! Talks to the bridge's REST surface: health, server discovery, tool
//! listings, tool execution, and confirmation resolution. All payloads
//! are JSON; responses are traversed as `serde_json::Value` with
//! missing fields collapsing to defaults.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::types::{BridgeClient, BridgeError, ParamSpec, Tool, ToolCall};

/// HTTP client for the MCP bridge.
pub struct BridgeHttpClient {
    base_url: String,
    http: Client,
}

impl BridgeHttpClient {
    /// Create a client for the bridge at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Internal helper: send a request and return the response JSON.
    ///
    /// Network failures become `Transport`; non-2xx responses become
    /// `Api` carrying the bridge's reported `error` text when the body
    /// parses as JSON, else the raw body.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, BridgeError> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = match method {
            "POST" => self.http.post(&url),
            _ => self.http.get(&url),
        };

        builder = builder.header("Content-Type", "application/json");
        if let Some(b) = body {
            builder = builder.json(&b);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| BridgeError::Transport(format!("{} {}: {}", method, path, e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| BridgeError::Transport(format!("{} {}: {}", method, path, e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"].as_str().map(|s| s.to_string()))
                .unwrap_or(text);
            return Err(BridgeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| BridgeError::Transport(format!("{} {}: invalid JSON: {}", method, path, e)))
    }
}

#[async_trait]
impl BridgeClient for BridgeHttpClient {
    async fn health(&self) -> Result<u64, BridgeError> {
        let result = self.request("GET", "/health", None).await?;
        Ok(result["serverCount"].as_u64().unwrap_or(0))
    }

    async fn list_servers(&self) -> Result<Vec<String>, BridgeError> {
        let result = self.request("GET", "/servers", None).await?;

        let servers = result["servers"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|s| s["id"].as_str().map(|id| id.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(servers)
    }

    async fn list_tools(&self, server_id: &str) -> Result<Vec<Tool>, BridgeError> {
        let encoded = urlencoding::encode(server_id);
        let result = self
            .request("GET", &format!("/servers/{}/tools", encoded), None)
            .await?;

        let tools = result["tools"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|t| parse_tool(server_id, t))
                    .collect()
            })
            .unwrap_or_default();

        Ok(tools)
    }

    async fn execute_tool(&self, call: &ToolCall) -> Result<Value, BridgeError> {
        let path = format!(
            "/servers/{}/tools/{}",
            urlencoding::encode(&call.server_id),
            urlencoding::encode(&call.tool_name),
        );
        self.request("POST", &path, Some(call.parameters.clone()))
            .await
    }

    async fn resolve_confirmation(
        &self,
        confirmation_id: &str,
        confirm: bool,
    ) -> Result<Value, BridgeError> {
        let path = format!("/confirmations/{}", urlencoding::encode(confirmation_id));
        self.request("POST", &path, Some(serde_json::json!({ "confirm": confirm })))
            .await
    }
}

/// Normalize one tool entry from the bridge's listing. A tool with no
/// name is dropped; everything else degrades to empty defaults.
fn parse_tool(server_id: &str, entry: &Value) -> Option<Tool> {
    let name = entry["name"].as_str()?.to_string();
    let description = entry["description"].as_str().unwrap_or("").to_string();

    let schema = &entry["inputSchema"];
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let parameters = schema["properties"]
        .as_object()
        .map(|props| {
            props
                .iter()
                .map(|(param, details)| ParamSpec {
                    name: param.clone(),
                    param_type: details["type"].as_str().unwrap_or("any").to_string(),
                    description: details["description"].as_str().unwrap_or("").to_string(),
                    required: required.contains(&param.as_str()),
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Tool {
        server_id: server_id.to_string(),
        name,
        description,
        parameters,
    })
}
