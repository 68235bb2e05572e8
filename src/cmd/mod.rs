/*!
Command tree layer.

This is the CLI side of the crate: a tree of named commands with typed
flags and run handlers, compiled into a `clap::Command` for parsing.

Layout:
  src/cmd/
    mod.rs         (this file; module declarations + re-exports)
    flag.rs        (FlagDef, FlagKind, FlagPrecedence)
    node.rs        (CommandNode builder, Handler)
    invocation.rs  (Invocation: parsed values + output writer)
    tree.rs        (CommandTree: validation, flag merge, clap compilation, execute)

Conventions:
  - Handlers never print to stdout directly; they write into the
    `Invocation`, which is the capture sink of the current call.
  - A tree is immutable once `CommandTree::new` succeeds.
*/

pub mod flag;
pub mod invocation;
pub mod node;
pub mod tree;

pub use flag::{FlagDef, FlagKind, FlagPrecedence};
pub use invocation::Invocation;
pub use node::{CommandNode, Handler};
pub use tree::{ARGS_KEY, CommandTree, ExecError, MAX_DEPTH, TreeError, effective_flags};
