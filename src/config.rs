//! Emissary Configuration
//!
//! The explicit configuration struct constructed once at startup and
//! passed by reference to every collaborator that needs it. No
//! component reads process environment or other ambient state itself;
//! `main` performs the single credential lookup and hands the result in.

use anyhow::{Context, Result};

/// Default MCP bridge base URL.
pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:3000";

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default maximum width for rendered JSON output.
pub const DEFAULT_JSON_WIDTH: usize = 100;

#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// MCP bridge base URL, port override already applied.
    pub bridge_url: String,
    pub gemini_api_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Show raw JSON results from tool executions.
    pub show_json: bool,
    /// Maximum width for rendered JSON output.
    pub json_width: usize,
    /// Optional cap on tool executions per utterance. `None` preserves
    /// the uncapped behavior and relies on the model self-terminating.
    pub max_steps: Option<usize>,
}

/// Raw settings as they arrive from the CLI surface, before resolution.
#[derive(Clone, Debug, Default)]
pub struct ConfigParams {
    pub bridge_url: Option<String>,
    pub bridge_port: Option<u16>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub hide_json: bool,
    pub json_width: Option<usize>,
    pub max_steps: Option<usize>,
}

impl AgentConfig {
    /// Resolve a full config from CLI parameters, filling defaults for
    /// unset fields. Fails when the model API key is absent; that is
    /// one of the two fatal startup conditions.
    pub fn resolve(params: ConfigParams) -> Result<AgentConfig> {
        let api_key = params
            .gemini_api_key
            .filter(|k| !k.is_empty())
            .context("GEMINI_API_KEY is not set")?;

        let base_url = params
            .bridge_url
            .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string());
        let bridge_url = apply_port_override(&base_url, params.bridge_port)?;

        Ok(AgentConfig {
            bridge_url,
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_api_key: api_key,
            gemini_model: params
                .gemini_model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            show_json: !params.hide_json,
            json_width: params.json_width.unwrap_or(DEFAULT_JSON_WIDTH),
            max_steps: params.max_steps,
        })
    }
}

/// Replace the port in `base_url` when an explicit override is given.
/// Trailing slashes are stripped so endpoint paths join cleanly.
fn apply_port_override(base_url: &str, port: Option<u16>) -> Result<String> {
    let mut url = reqwest::Url::parse(base_url)
        .with_context(|| format!("Invalid bridge URL: {}", base_url))?;

    if let Some(p) = port {
        url.set_port(Some(p))
            .map_err(|_| anyhow::anyhow!("Cannot set port on bridge URL: {}", base_url))?;
    }

    Ok(url.to_string().trim_end_matches('/').to_string())
}
