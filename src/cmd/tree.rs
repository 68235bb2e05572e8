/*!
tree.rs - validated command tree + argv execution.

`CommandTree::new` checks the node hierarchy once and compiles it into a
`clap::Command`. After that the tree is read-only and `execute` may be
called from any number of threads.

Flag model on the clap side:
  - a runnable command (leaf, or any node with a handler) carries its
    effective flag set as plain local `--long` options: its own flags
    merged with every ancestor's, collisions resolved by `FlagPrecedence`
  - pure groups carry no flags, so flags go after the full command path
  - leaf commands accept trailing positional tokens under `ARGS_KEY`
  - argv never carries a binary name; the first token is the first
    path segment below the root

The MCP schema is derived from the same `effective_flags`, so what a tool
advertises and what the parser accepts cannot drift apart.
*/

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::Write;
use std::iter;

use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ColorChoice, Command, value_parser};
use thiserror::Error;

use super::flag::{FlagDef, FlagKind, FlagPrecedence};
use super::invocation::Invocation;
use super::node::CommandNode;

/// Argument key reserved for trailing positional tokens.
pub const ARGS_KEY: &str = "args";

/// Deepest nesting accepted by `CommandTree::new`.
pub const MAX_DEPTH: usize = 64;

const RESERVED_FLAGS: &[&str] = &[ARGS_KEY, "help"];

/* ---- Errors ---- */

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("command under '{parent}' has an empty name")]
    EmptyCommandName { parent: String },

    #[error("command '{command}' has more than one child named '{child}'")]
    DuplicateCommand { command: String, child: String },

    #[error("command '{command}' declares a flag with an empty name")]
    EmptyFlagName { command: String },

    #[error("command '{command}' declares flag '{flag}' more than once")]
    DuplicateFlag { command: String, flag: String },

    #[error("flag name '{flag}' on command '{command}' is not a valid long option")]
    InvalidFlagName { command: String, flag: String },

    #[error("flag name '{flag}' on command '{command}' is reserved")]
    ReservedFlag { command: String, flag: String },

    #[error("command tree is nested deeper than {MAX_DEPTH} levels at '{command}'")]
    TooDeep { command: String },
}

#[derive(Debug, Error)]
pub enum ExecError {
    /// argv was rejected by the parser; carries the rendered parser message.
    #[error("{0}")]
    Parse(String),

    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),

    /// The command's handler returned an error.
    #[error("{0:#}")]
    Failed(anyhow::Error),

    #[error("failed to write command output: {0}")]
    Io(#[from] std::io::Error),
}

/* ---- Tree ---- */

pub struct CommandTree {
    root: CommandNode,
    cli: Command,
    precedence: FlagPrecedence,
}

impl CommandTree {
    pub fn new(root: CommandNode) -> Result<Self, TreeError> {
        Self::with_precedence(root, FlagPrecedence::default())
    }

    pub fn with_precedence(
        root: CommandNode,
        precedence: FlagPrecedence,
    ) -> Result<Self, TreeError> {
        validate(&root)?;
        let cli = build_command(&root, &[], precedence)
            .no_binary_name(true)
            .disable_help_subcommand(true)
            .color(ColorChoice::Never);
        Ok(Self {
            root,
            cli,
            precedence,
        })
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    pub fn precedence(&self) -> FlagPrecedence {
        self.precedence
    }

    /// Parse `argv` and run the matched command, writing its output to `out`.
    ///
    /// Help requests render help text into `out` and count as success, as
    /// does selecting a command without a handler.
    pub fn execute<I, T>(&self, argv: I, out: &mut dyn Write) -> Result<(), ExecError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cli = self.cli.clone();
        let matches = match cli.try_get_matches_from_mut(argv) {
            Ok(matches) => matches,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                write!(out, "{err}")?;
                return Ok(());
            }
            Err(err) => return Err(ExecError::Parse(err.to_string().trim_end().to_string())),
        };

        let mut node = &self.root;
        let mut command = &cli;
        let mut current = &matches;
        while let Some((name, sub)) = current.subcommand() {
            node = node
                .child(name)
                .ok_or_else(|| ExecError::UnknownCommand(name.to_string()))?;
            command = command
                .find_subcommand(name)
                .ok_or_else(|| ExecError::UnknownCommand(name.to_string()))?;
            current = sub;
        }

        match node.handler() {
            Some(handler) => {
                let mut invocation = Invocation::new(current, out);
                handler(&mut invocation).map_err(ExecError::Failed)
            }
            None => {
                write!(out, "{}", command.clone().render_help())?;
                Ok(())
            }
        }
    }
}

/* ---- Validation ---- */

fn validate(root: &CommandNode) -> Result<(), TreeError> {
    let mut stack: Vec<(&CommandNode, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            return Err(TreeError::TooDeep {
                command: node.name().to_string(),
            });
        }

        let mut flags = HashSet::new();
        for flag in node.flags() {
            if flag.name.is_empty() {
                return Err(TreeError::EmptyFlagName {
                    command: node.name().to_string(),
                });
            }
            if !is_long_option(&flag.name) {
                return Err(TreeError::InvalidFlagName {
                    command: node.name().to_string(),
                    flag: flag.name.clone(),
                });
            }
            if RESERVED_FLAGS.contains(&flag.name.as_str()) {
                return Err(TreeError::ReservedFlag {
                    command: node.name().to_string(),
                    flag: flag.name.clone(),
                });
            }
            if !flags.insert(flag.name.as_str()) {
                return Err(TreeError::DuplicateFlag {
                    command: node.name().to_string(),
                    flag: flag.name.clone(),
                });
            }
        }

        let mut names = HashSet::new();
        for child in node.children() {
            if child.name().is_empty() {
                return Err(TreeError::EmptyCommandName {
                    parent: node.name().to_string(),
                });
            }
            if !names.insert(child.name()) {
                return Err(TreeError::DuplicateCommand {
                    command: node.name().to_string(),
                    child: child.name().to_string(),
                });
            }
            stack.push((child, depth + 1));
        }
    }
    Ok(())
}

// `--name value` and `--name=value` must both split back into this name.
fn is_long_option(name: &str) -> bool {
    !name.starts_with('-') && !name.contains('=') && !name.chars().any(char::is_whitespace)
}

/* ---- Flag merge ---- */

/// Merge own and inherited flags by name.
///
/// Levels are visited leaf first, then parent, up to the root. A name keeps
/// the position of its first occurrence. With `Inherited` precedence a
/// later level replaces the entry, so the root-most definition wins; with
/// `Local` the first (leaf-most) definition is kept.
pub fn effective_flags<'a>(
    node: &'a CommandNode,
    ancestors: &[&'a CommandNode],
    precedence: FlagPrecedence,
) -> Vec<&'a FlagDef> {
    let mut merged: Vec<&'a FlagDef> = Vec::new();
    let levels = iter::once(node).chain(ancestors.iter().rev().copied());
    for level in levels {
        for flag in level.flags() {
            match merged.iter().position(|f| f.name == flag.name) {
                Some(i) if precedence == FlagPrecedence::Inherited => merged[i] = flag,
                Some(_) => {}
                None => merged.push(flag),
            }
        }
    }
    merged
}

/* ---- clap compilation ---- */

// Depth is bounded by `validate`.
fn build_command(
    node: &CommandNode,
    ancestors: &[&CommandNode],
    precedence: FlagPrecedence,
) -> Command {
    let mut cmd = Command::new(node.name().to_string());
    if !node.about_text().is_empty() {
        cmd = cmd.about(node.about_text().to_string());
    }
    if !node.long_about_text().is_empty() {
        cmd = cmd.long_about(node.long_about_text().to_string());
    }

    if node.is_leaf() || node.handler().is_some() {
        for flag in effective_flags(node, ancestors, precedence) {
            cmd = cmd.arg(flag_arg(flag));
        }
    }

    if node.is_leaf() {
        cmd = cmd.arg(
            Arg::new(ARGS_KEY)
                .value_name("ARGS")
                .num_args(0..)
                .action(ArgAction::Append),
        );
    }

    let mut chain = ancestors.to_vec();
    chain.push(node);
    for child in node.children() {
        cmd = cmd.subcommand(build_command(child, &chain, precedence));
    }
    cmd
}

fn flag_arg(flag: &FlagDef) -> Arg {
    let arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .help(flag.usage.clone())
        .action(ArgAction::Set);

    // Values such as `-3` or `-x` belong to the flag, not to the parser.
    let mut arg = match flag.kind {
        FlagKind::Bool => arg
            .value_parser(BoolishValueParser::new())
            .num_args(0..=1)
            .default_missing_value("true"),
        FlagKind::Int => arg
            .value_parser(value_parser!(i64))
            .allow_hyphen_values(true),
        FlagKind::Float32 => arg
            .value_parser(value_parser!(f32))
            .allow_hyphen_values(true),
        FlagKind::Float64 => arg
            .value_parser(value_parser!(f64))
            .allow_hyphen_values(true),
        FlagKind::String | FlagKind::Other(_) => arg
            .value_parser(value_parser!(String))
            .allow_hyphen_values(true),
    };

    // Malformed defaults are left out instead of failing every parse.
    if flag.is_defaulted() && flag.kind.accepts(&flag.default) {
        arg = arg.default_value(flag.default.trim().to_string());
    }
    arg
}
