/*!
node.rs - command nodes.

A `CommandNode` owns its flags and its children. There is no parent link:
paths are rebuilt while walking the tree from the root.

Nodes are assembled with a small builder:

  CommandNode::new("greet")
      .about("Greet someone")
      .flag(FlagDef::string("name", "Foo", "Name to greet"))
      .run(|inv| {
          let name = inv.string("name").unwrap_or_default().to_string();
          writeln!(inv, "Hello, {name}!")?;
          Ok(())
      })
*/

use std::fmt;
use std::sync::Arc;

use super::flag::FlagDef;
use super::invocation::Invocation;

/// Run handler of a command. Output goes through the `Invocation` writer.
pub type Handler = Arc<dyn Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync>;

#[derive(Clone)]
pub struct CommandNode {
    name: String,
    about: String,
    long_about: String,
    flags: Vec<FlagDef>,
    children: Vec<CommandNode>,
    handler: Option<Handler>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: String::new(),
            long_about: String::new(),
            flags: Vec::new(),
            children: Vec::new(),
            handler: None,
        }
    }

    /// Short, one-line description.
    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.about = text.into();
        self
    }

    pub fn long_about(mut self, text: impl Into<String>) -> Self {
        self.long_about = text.into();
        self
    }

    pub fn flag(mut self, flag: FlagDef) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn subcommand(mut self, child: CommandNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn run<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about_text(&self) -> &str {
        &self.about
    }

    pub fn long_about_text(&self) -> &str {
        &self.long_about
    }

    /// Short text, falling back to the long text.
    pub fn description(&self) -> &str {
        if self.about.is_empty() {
            &self.long_about
        } else {
            &self.about
        }
    }

    pub fn flags(&self) -> &[FlagDef] {
        &self.flags
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("runnable", &self.handler.is_some())
            .finish()
    }
}
