//! mcp-tree: expose the leaf commands of a CLI command tree as MCP tools.
//!
//! Build a `CommandNode` hierarchy, validate it into a `CommandTree`, then
//! either execute argv directly or hand the tree to `ToolServer` and serve
//! it over stdio. Each leaf command becomes one tool named after its path
//! below the root (`"user add"`), with one parameter per effective flag.

pub mod cmd;
pub mod config;
pub mod mcp;
pub mod utils;

pub use cmd::{CommandNode, CommandTree, FlagDef, FlagKind, FlagPrecedence, Invocation};
pub use config::ServerConfig;
pub use mcp::ToolServer;
