//! MCP side of the crate: leaf discovery, schema derivation, dispatch and
//! the rmcp server handler.
//!
//! introspect -> schema -> server (registration), server -> dispatch (calls)

pub mod dispatch;
pub mod introspect;
pub mod schema;
pub mod server;

pub use dispatch::{Dispatcher, build_argv, render_value};
pub use introspect::{LeafCommand, leaf_commands};
pub use schema::{ParamType, ParameterSchema, ToolSpec, build_tools};
pub use server::{ToolServer, client_config};
