//! Server configuration.
//!
//! Identity defaults come from the command tree's root; the log location
//! may be overridden with `MCP_TREE_LOG`.

use std::path::PathBuf;

use crate::cmd::CommandTree;

/// Environment variable overriding the diagnostic log path.
pub const LOG_PATH_ENV: &str = "MCP_TREE_LOG";

pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Reported as the MCP server name.
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
    /// Explicit log file. `None` means the default candidates.
    pub log_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Name from the root's description (falling back to its name),
    /// version `1.0.0`, log path from the environment.
    pub fn for_tree(tree: &CommandTree) -> Self {
        let root = tree.root();
        let name = if root.description().is_empty() {
            root.name().to_string()
        } else {
            root.description().to_string()
        };
        Self {
            name,
            version: DEFAULT_VERSION.to_string(),
            instructions: None,
            log_path: log_path_from_env(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }
}

pub fn log_path_from_env() -> Option<PathBuf> {
    std::env::var(LOG_PATH_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}
