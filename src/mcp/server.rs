/*!
server.rs - tool registry + MCP server handler.

`ToolServer::new` derives one tool per leaf command and freezes the set.
The handler answers:
  tools/list  -> every registered tool
  tools/call  -> dispatcher output as a single text item

Every call result is a successful tool response, including failures of the
underlying command and unknown tool names. Only transport failures leave
`serve_stdio` with an error.
*/

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::transport::io::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::json;
use tracing::{error, info};

use super::dispatch::Dispatcher;
use super::schema::{ToolSpec, build_tools};
use crate::cmd::CommandTree;
use crate::config::ServerConfig;

struct Registry {
    config: ServerConfig,
    specs: Vec<ToolSpec>,
    tools: Vec<Tool>,
    dispatcher: Dispatcher,
}

#[derive(Clone)]
pub struct ToolServer {
    inner: Arc<Registry>,
}

impl ToolServer {
    pub fn new(tree: CommandTree, config: ServerConfig) -> Self {
        let specs = build_tools(&tree);
        let tools = specs
            .iter()
            .map(|spec| {
                info!(
                    tool = %spec.name,
                    description = %spec.description,
                    parameters = spec.parameters.len(),
                    "registering tool"
                );
                spec.to_tool()
            })
            .collect();

        Self {
            inner: Arc::new(Registry {
                config,
                specs,
                tools,
                dispatcher: Dispatcher::new(Arc::new(tree)),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.inner.specs
    }

    pub fn find(&self, name: &str) -> Option<&ToolSpec> {
        self.inner.specs.iter().find(|s| s.name == name)
    }

    /// Run a tool synchronously and return its result text.
    pub fn call(&self, name: &str, arguments: &JsonObject) -> String {
        match self.find(name) {
            Some(spec) => self.inner.dispatcher.invoke(&spec.path, arguments),
            None => {
                error!(tool = %name, "unknown tool");
                format!("unknown tool \"{name}\"")
            }
        }
    }

    /// `call` on the blocking pool, so handlers may block freely.
    pub async fn call_blocking(&self, name: String, arguments: JsonObject) -> String {
        let server = self.clone();
        tokio::task::spawn_blocking(move || server.call(&name, &arguments))
            .await
            .unwrap_or_else(|e| format!("tool execution aborted: {e}"))
    }

    /// Serve over stdin/stdout until the peer disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        info!(
            name = %self.inner.config.name,
            tools = self.inner.tools.len(),
            "serving on stdio"
        );
        let service = self
            .serve(stdio())
            .await
            .context("Failed to start MCP service")?;
        let reason = service.waiting().await.context("MCP service task failed")?;
        info!(?reason, "server stopped");
        Ok(())
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        let config = &self.inner.config;
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: config.name.clone(),
                version: config.version.clone(),
                ..Default::default()
            },
            instructions: config.instructions.clone(),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.inner.tools.clone()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        info!(tool = %request.name, arguments = %json!(arguments), "invoking tool");
        let text = self.call_blocking(request.name.to_string(), arguments).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

/// `mcpServers` snippet for MCP client configuration files.
pub fn client_config(command_path: &str) -> serde_json::Value {
    let exe_name = std::path::Path::new(command_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("mcp-tree");

    json!({
        "mcpServers": {
            exe_name: {
                "command": command_path,
                "args": ["mcp-server"]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{CommandNode, FlagDef};
    use std::io::Write;

    fn server() -> ToolServer {
        let root = CommandNode::new("foo").about("Foo Demo CLI").subcommand(
            CommandNode::new("greet")
                .about("Greet someone")
                .flag(FlagDef::string("name", "Foo", "Name to greet"))
                .run(|inv| {
                    let name = inv.string("name").unwrap_or_default().to_string();
                    writeln!(inv, "Hello, {name}!")?;
                    Ok(())
                }),
        );
        let tree = CommandTree::new(root).unwrap();
        let config = ServerConfig::for_tree(&tree);
        ToolServer::new(tree, config)
    }

    #[test]
    fn registers_one_tool_per_leaf() {
        let s = server();
        assert_eq!(s.specs().len(), 1);
        assert_eq!(s.find("greet").map(|t| t.description.as_str()), Some("Greet someone"));
    }

    #[test]
    fn get_info_uses_root_description() {
        let info = server().get_info();
        assert_eq!(info.server_info.name, "Foo Demo CLI");
        assert_eq!(info.server_info.version, "1.0.0");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn unknown_tool_is_text() {
        assert_eq!(
            server().call("nope", &JsonObject::new()),
            "unknown tool \"nope\""
        );
    }

    #[tokio::test]
    async fn call_blocking_runs_command() {
        let s = server();
        let mut args = JsonObject::new();
        args.insert("name".into(), json!("World"));
        assert_eq!(s.call_blocking("greet".into(), args).await, "Hello, World!\n");
    }

    #[test]
    fn client_config_uses_executable_name() {
        let cfg = client_config("/usr/local/bin/foo");
        assert_eq!(cfg["mcpServers"]["foo"]["command"], "/usr/local/bin/foo");
        assert_eq!(cfg["mcpServers"]["foo"]["args"], json!(["mcp-server"]));
    }
}
