use anyhow::{Context, Result};
use tracing::{error, info};

use mcp_tree::mcp::client_config;
use mcp_tree::{CommandTree, ServerConfig, ToolServer, config, utils};

mod demo;

/// foo - demo CLI whose leaf commands double as MCP tools.
///
/// Modes (selected by the last argument):
///   foo <command> [flags] [args]   run a command directly
///   foo mcp-server                 serve every leaf command as an MCP tool on stdio
///   foo mcp-config                 print an `mcpServers` client snippet
///
/// Env:
///   MCP_TREE_LOG   diagnostic log file (default /tmp/mcp-tree.log, then ~/mcp-tree.log)
///   RUST_LOG       log level filter (default info)
#[tokio::main]
async fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    utils::init_logging(config::log_path_from_env().as_deref())?;
    info!(?argv, "starting foo");

    let tree = CommandTree::new(demo::command()).context("Invalid command tree")?;

    match argv.last().map(String::as_str) {
        Some("mcp-server") => serve(tree).await,
        Some("mcp-config") => {
            let exe = std::env::current_exe()
                .ok()
                .and_then(|p| p.to_str().map(str::to_string))
                .unwrap_or_else(|| "foo".to_string());
            println!("{}", serde_json::to_string_pretty(&client_config(&exe))?);
            Ok(())
        }
        _ => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if let Err(e) = tree.execute(&argv, &mut out) {
                error!(error = %e, "command failed");
                println!("{e}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn serve(tree: CommandTree) -> Result<()> {
    let config = ServerConfig::for_tree(&tree);
    let server = ToolServer::new(tree, config);

    tokio::select! {
        res = server.serve_stdio() => {
            if let Err(e) = &res {
                error!(error = %format!("{e:#}"), "MCP server error");
            }
            res
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            Ok(())
        }
    }
}
