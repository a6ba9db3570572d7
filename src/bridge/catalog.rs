//! Tool Catalog
//!
//! Fetches every server's tool listing from the bridge and renders the
//! capability description that gets baked into the model's system
//! instruction. Discovery order is preserved so repeated runs against
//! an unchanged bridge produce byte-identical descriptions.

use tracing::warn;

use crate::types::{BridgeClient, Tool};

/// Tools grouped under the server that owns them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerTools {
    pub server_id: String,
    pub tools: Vec<Tool>,
}

/// The normalized in-memory catalog, ordered by server discovery.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolCatalog {
    servers: Vec<ServerTools>,
}

impl ToolCatalog {
    /// Fetch the full catalog from the bridge.
    ///
    /// Fails soft: a server whose tool listing errors contributes an
    /// empty entry and a warning instead of aborting the fetch; a
    /// failed server listing yields an empty catalog. The caller is
    /// warned, never blocked.
    pub async fn fetch(bridge: &dyn BridgeClient) -> Self {
        let server_ids = match bridge.list_servers().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to list servers from bridge: {}", e);
                return Self::default();
            }
        };

        let mut servers = Vec::with_capacity(server_ids.len());
        for server_id in server_ids {
            // Per-entry result, collapsed to empty at this boundary.
            let listed: Result<Vec<Tool>, _> = bridge.list_tools(&server_id).await;
            let tools = match listed {
                Ok(tools) => tools,
                Err(e) => {
                    warn!("Failed to list tools for server {}: {}", server_id, e);
                    Vec::new()
                }
            };
            servers.push(ServerTools { server_id, tools });
        }

        Self { servers }
    }

    /// Build a catalog directly from grouped tools, in the given order.
    pub fn from_servers(servers: Vec<ServerTools>) -> Self {
        Self { servers }
    }

    pub fn servers(&self) -> &[ServerTools] {
        &self.servers
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn tool_count(&self) -> usize {
        self.servers.iter().map(|s| s.tools.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tool_count() == 0
    }

    /// Render the capability listing used verbatim inside the system
    /// instruction: per-server headers, per-tool name, description, and
    /// typed parameter list with a required-parameter summary.
    pub fn describe(&self) -> String {
        let mut out = String::from("Available tools by server:\n\n");

        for server in &self.servers {
            out.push_str(&format!("## Server: {}\n\n", server.server_id));

            for tool in &server.tools {
                out.push_str(&format!("### {}\n", tool.name));
                let description = if tool.description.is_empty() {
                    "No description"
                } else {
                    &tool.description
                };
                out.push_str(&format!("Description: {}\n", description));

                if !tool.parameters.is_empty() {
                    out.push_str("Parameters:\n");
                    for param in &tool.parameters {
                        out.push_str(&format!(
                            "- {} ({}): {}\n",
                            param.name, param.param_type, param.description
                        ));
                    }

                    let required: Vec<&str> = tool
                        .parameters
                        .iter()
                        .filter(|p| p.required)
                        .map(|p| p.name.as_str())
                        .collect();
                    if !required.is_empty() {
                        out.push_str(&format!(
                            "Required parameters: {}\n",
                            required.join(", ")
                        ));
                    }
                }

                out.push('\n');
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BridgeClient, BridgeError, ParamSpec, ToolCall};
    use async_trait::async_trait;
    use serde_json::Value;

    struct FlakyBridge;

    #[async_trait]
    impl BridgeClient for FlakyBridge {
        async fn health(&self) -> Result<u64, BridgeError> {
            Ok(2)
        }

        async fn list_servers(&self) -> Result<Vec<String>, BridgeError> {
            Ok(vec!["fs".to_string(), "web".to_string()])
        }

        async fn list_tools(&self, server_id: &str) -> Result<Vec<Tool>, BridgeError> {
            match server_id {
                "fs" => Ok(vec![sample_tool("fs", "read_file")]),
                _ => Err(BridgeError::Transport("connection reset".to_string())),
            }
        }

        async fn execute_tool(&self, _call: &ToolCall) -> Result<Value, BridgeError> {
            unimplemented!("not exercised by catalog tests")
        }

        async fn resolve_confirmation(
            &self,
            _confirmation_id: &str,
            _confirm: bool,
        ) -> Result<Value, BridgeError> {
            unimplemented!("not exercised by catalog tests")
        }
    }

    struct DeadBridge;

    #[async_trait]
    impl BridgeClient for DeadBridge {
        async fn health(&self) -> Result<u64, BridgeError> {
            Err(BridgeError::Transport("connection refused".to_string()))
        }

        async fn list_servers(&self) -> Result<Vec<String>, BridgeError> {
            Err(BridgeError::Transport("connection refused".to_string()))
        }

        async fn list_tools(&self, _server_id: &str) -> Result<Vec<Tool>, BridgeError> {
            Err(BridgeError::Transport("connection refused".to_string()))
        }

        async fn execute_tool(&self, _call: &ToolCall) -> Result<Value, BridgeError> {
            Err(BridgeError::Transport("connection refused".to_string()))
        }

        async fn resolve_confirmation(
            &self,
            _confirmation_id: &str,
            _confirm: bool,
        ) -> Result<Value, BridgeError> {
            Err(BridgeError::Transport("connection refused".to_string()))
        }
    }

    fn sample_tool(server_id: &str, name: &str) -> Tool {
        Tool {
            server_id: server_id.to_string(),
            name: name.to_string(),
            description: format!("{} tool", name),
            parameters: vec![ParamSpec {
                name: "path".to_string(),
                param_type: "string".to_string(),
                description: "Target path".to_string(),
                required: true,
            }],
        }
    }

    #[tokio::test]
    async fn test_fetch_fails_soft_per_server() {
        let catalog = ToolCatalog::fetch(&FlakyBridge).await;

        // Both servers present; the failing one has an empty entry.
        assert_eq!(catalog.server_count(), 2);
        assert_eq!(catalog.servers()[0].server_id, "fs");
        assert_eq!(catalog.servers()[0].tools.len(), 1);
        assert_eq!(catalog.servers()[1].server_id, "web");
        assert!(catalog.servers()[1].tools.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_empty_when_server_listing_fails() {
        let catalog = ToolCatalog::fetch(&DeadBridge).await;
        assert_eq!(catalog.server_count(), 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_describe_is_deterministic() {
        let build = || {
            ToolCatalog::from_servers(vec![
                ServerTools {
                    server_id: "fs".to_string(),
                    tools: vec![sample_tool("fs", "read_file"), sample_tool("fs", "write_file")],
                },
                ServerTools {
                    server_id: "web".to_string(),
                    tools: vec![sample_tool("web", "fetch")],
                },
            ])
        };

        assert_eq!(build().describe(), build().describe());
    }

    #[test]
    fn test_describe_preserves_discovery_order() {
        let catalog = ToolCatalog::from_servers(vec![
            ServerTools {
                server_id: "zeta".to_string(),
                tools: vec![],
            },
            ServerTools {
                server_id: "alpha".to_string(),
                tools: vec![],
            },
        ]);

        let description = catalog.describe();
        let zeta = description.find("## Server: zeta").unwrap();
        let alpha = description.find("## Server: alpha").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_describe_renders_params_and_required_summary() {
        let catalog = ToolCatalog::from_servers(vec![ServerTools {
            server_id: "fs".to_string(),
            tools: vec![sample_tool("fs", "read_file")],
        }]);

        let description = catalog.describe();
        assert!(description.contains("### read_file"));
        assert!(description.contains("Description: read_file tool"));
        assert!(description.contains("- path (string): Target path"));
        assert!(description.contains("Required parameters: path"));
    }

    #[test]
    fn test_describe_no_description_placeholder() {
        let catalog = ToolCatalog::from_servers(vec![ServerTools {
            server_id: "fs".to_string(),
            tools: vec![Tool {
                server_id: "fs".to_string(),
                name: "bare".to_string(),
                description: String::new(),
                parameters: vec![],
            }],
        }]);

        assert!(catalog.describe().contains("Description: No description"));
    }
}
