//! Leaf discovery and effective flag resolution.
//!
//! Walks a `CommandTree` depth-first (explicit stack, declaration order) and
//! returns every leaf with its path below the root and the flags it accepts.

use std::iter;

use crate::cmd::{CommandNode, CommandTree, FlagDef, effective_flags};

/// A leaf command together with everything needed to expose it as a tool.
#[derive(Debug, Clone)]
pub struct LeafCommand<'a> {
    pub node: &'a CommandNode,
    /// Names from just below the root down to the leaf.
    pub path: Vec<String>,
    /// Own flags first, then inherited ones nearest-ancestor first.
    pub flags: Vec<&'a FlagDef>,
}

impl LeafCommand<'_> {
    pub fn tool_name(&self) -> String {
        self.path.join(" ")
    }
}

pub fn leaf_commands(tree: &CommandTree) -> Vec<LeafCommand<'_>> {
    let precedence = tree.precedence();
    let mut leaves = Vec::new();
    let mut stack: Vec<(&CommandNode, Vec<&CommandNode>)> = vec![(tree.root(), Vec::new())];

    while let Some((node, ancestors)) = stack.pop() {
        if node.is_leaf() {
            leaves.push(LeafCommand {
                node,
                path: command_path(&ancestors, node),
                flags: effective_flags(node, &ancestors, precedence),
            });
            continue;
        }
        let mut chain = ancestors;
        chain.push(node);
        // Reversed so the first child is popped first.
        for child in node.children().iter().rev() {
            stack.push((child, chain.clone()));
        }
    }
    leaves
}

/// Path of `node` given its ancestors (root first). The root is excluded.
pub fn command_path<'a>(ancestors: &[&'a CommandNode], node: &'a CommandNode) -> Vec<String> {
    ancestors
        .iter()
        .copied()
        .chain(iter::once(node))
        .skip(1)
        .map(|n| n.name().to_string())
        .collect()
}
