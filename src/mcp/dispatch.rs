/*!
dispatch.rs - turn a tool call back into a command execution.

Per call:
  1. argv = command path (root excluded)
  2. + `--<key> <value>` for every argument except `args`, in request order
  3. + each element of `args` (when it is an array), in order
  4. execute through the command tree with a fresh in-memory sink
  5. success -> captured text, failure -> failure message as text

Each call owns its sink, so concurrent calls cannot see each other's
output. Argument order follows the request object; commands whose parsing
depends on flag order will see whatever order the caller used.
*/

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rmcp::model::JsonObject;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cmd::{ARGS_KEY, CommandTree};

/// Rebuild the argument vector for a command path and a set of arguments.
pub fn build_argv(path: &[String], arguments: &JsonObject) -> Vec<String> {
    let mut argv: Vec<String> = path.to_vec();

    for (key, value) in arguments {
        if key == ARGS_KEY {
            continue;
        }
        argv.push(format!("--{key}"));
        argv.push(render_value(value));
    }

    if let Some(Value::Array(items)) = arguments.get(ARGS_KEY) {
        argv.extend(items.iter().map(render_value));
    }
    argv
}

const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Textual rendering of an argument value. No quoting or escaping.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            // 42.0 -> "42" so integer flags accept it. Beyond 2^53 an f64
            // no longer names a single integer.
            if n.is_f64()
                && let Some(f) = n.as_f64()
                && f.fract() == 0.0
                && f.abs() <= MAX_EXACT_INT
            {
                format!("{}", f as i64)
            } else {
                n.to_string()
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    tree: Arc<CommandTree>,
}

impl Dispatcher {
    pub fn new(tree: Arc<CommandTree>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Execute the command at `path` and return its output or failure text.
    ///
    /// Never fails: parse errors, handler errors and handler panics all come
    /// back as text.
    pub fn invoke(&self, path: &[String], arguments: &JsonObject) -> String {
        let argv = build_argv(path, arguments);
        debug!(?argv, "executing command");

        let mut captured: Vec<u8> = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.tree.execute(argv.iter(), &mut captured)
        }));

        match outcome {
            Ok(Ok(())) => String::from_utf8_lossy(&captured).into_owned(),
            Ok(Err(err)) => {
                warn!(?argv, error = %err, "command failed");
                let message = err.to_string();
                if message.trim().is_empty() {
                    "command failed".to_string()
                } else {
                    message
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(?argv, panic = %message, "command panicked");
                format!("command panicked: {message}")
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{CommandNode, FlagDef};
    use serde_json::json;
    use std::io::Write;

    fn obj(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn argv_is_path_then_flags_then_args() {
        let argv = build_argv(
            &path(&["user", "add"]),
            &obj(json!({
                "args": ["x", 2, true],
                "email": "a@b.c",
                "admin": true,
            })),
        );
        assert_eq!(
            argv,
            vec!["user", "add", "--email", "a@b.c", "--admin", "true", "x", "2", "true"]
        );
    }

    #[test]
    fn non_list_args_value_is_ignored() {
        let argv = build_argv(&path(&["ls"]), &obj(json!({ "args": "oops" })));
        assert_eq!(argv, vec!["ls"]);
    }

    #[test]
    fn render_values() {
        assert_eq!(render_value(&json!("plain text")), "plain text");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(42.0)), "42");
        assert_eq!(render_value(&json!(-1.5)), "-1.5");
        assert_eq!(render_value(&json!(1e15)), "1000000000000000");
        assert_eq!(render_value(&json!(-9007199254740992.0)), "-9007199254740992");
        assert_eq!(render_value(&json!(false)), "false");
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(render_value(&json!(["a", 1])), r#"["a",1]"#);
    }

    fn dispatcher() -> Dispatcher {
        let root = CommandNode::new("foo")
            .subcommand(
                CommandNode::new("greet")
                    .flag(FlagDef::string("name", "Foo", "Name to greet"))
                    .run(|inv| {
                        let name = inv.string("name").unwrap_or_default().to_string();
                        writeln!(inv, "Hello, {name}!")?;
                        Ok(())
                    }),
            )
            .subcommand(CommandNode::new("boom").run(|_| panic!("kaboom")))
            .subcommand(CommandNode::new("silent-fail").run(|_| Err(anyhow::anyhow!(""))));
        Dispatcher::new(Arc::new(CommandTree::new(root).unwrap()))
    }

    #[test]
    fn invoke_captures_output() {
        let d = dispatcher();
        assert_eq!(
            d.invoke(&path(&["greet"]), &obj(json!({ "name": "World" }))),
            "Hello, World!\n"
        );
        assert_eq!(d.invoke(&path(&["greet"]), &JsonObject::new()), "Hello, Foo!\n");
    }

    #[test]
    fn invoke_reports_parse_failure_as_text() {
        let text = dispatcher().invoke(&path(&["greet"]), &obj(json!({ "bogus": 1 })));
        assert!(text.contains("--bogus"), "{text}");
    }

    #[test]
    fn invoke_recovers_from_panics() {
        let text = dispatcher().invoke(&path(&["boom"]), &JsonObject::new());
        assert_eq!(text, "command panicked: kaboom");
    }

    #[test]
    fn empty_failure_message_is_replaced() {
        let text = dispatcher().invoke(&path(&["silent-fail"]), &JsonObject::new());
        assert_eq!(text, "command failed");
    }
}
