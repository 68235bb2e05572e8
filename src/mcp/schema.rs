/*!
schema.rs - tool schemas derived from leaf commands.

Type mapping (flag tag -> parameter type, default):
  string            -> string   (default text as-is)
  int               -> number   (default parsed as float)
  bool              -> boolean  (default parsed as boolean)
  float32 / float64 -> number   (default parsed as float)
  other             -> string   (no default)

Rules:
  - required <=> the flag's default text is empty
  - a malformed default degrades to the type's zero value; the tool is
    still emitted
  - every tool also accepts an optional `args` array of trailing
    positional tokens
*/

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde::Serialize;
use serde_json::{Value, json};

use super::introspect::{LeafCommand, leaf_commands};
use crate::cmd::{ARGS_KEY, CommandTree, FlagDef, FlagKind, flag::parse_bool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub required: bool,
}

impl ParameterSchema {
    pub fn from_flag(flag: &FlagDef) -> Self {
        let (kind, default) = match &flag.kind {
            FlagKind::String => (ParamType::String, Some(json!(flag.default))),
            FlagKind::Int | FlagKind::Float32 | FlagKind::Float64 => {
                (ParamType::Number, Some(json!(parse_number(&flag.default))))
            }
            FlagKind::Bool => (
                ParamType::Boolean,
                Some(json!(parse_bool(&flag.default).unwrap_or(false))),
            ),
            FlagKind::Other(_) => (ParamType::String, None),
        };
        Self {
            name: flag.name.clone(),
            kind,
            description: flag.usage.clone(),
            default,
            required: flag.is_required(),
        }
    }

    /// JSON Schema property for this parameter.
    pub fn property(&self) -> Value {
        let mut prop = json!({
            "type": self.kind.as_str(),
            "description": self.description,
        });
        if let Some(default) = &self.default {
            prop["default"] = default.clone();
        }
        prop
    }
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Registration record of one leaf command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSchema>,
    /// argv prefix selecting the command.
    #[serde(skip)]
    pub path: Vec<String>,
}

impl ToolSpec {
    pub fn from_leaf(leaf: &LeafCommand<'_>) -> Self {
        Self {
            name: leaf.tool_name(),
            description: leaf.node.description().to_string(),
            parameters: leaf
                .flags
                .iter()
                .map(|f| ParameterSchema::from_flag(f))
                .collect(),
            path: leaf.path.clone(),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        for param in &self.parameters {
            properties.insert(param.name.clone(), param.property());
        }
        properties.insert(
            ARGS_KEY.to_string(),
            json!({
                "type": "array",
                "items": { "type": "string" },
                "description": "Trailing positional arguments",
            }),
        );

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = JsonObject::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::new(self.input_schema()),
        )
    }
}

/// One `ToolSpec` per leaf command, in depth-first order.
pub fn build_tools(tree: &CommandTree) -> Vec<ToolSpec> {
    leaf_commands(tree).iter().map(ToolSpec::from_leaf).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::CommandNode;

    fn spec_for(flags: Vec<FlagDef>) -> ToolSpec {
        let mut leaf = CommandNode::new("leaf").about("A leaf").run(|_| Ok(()));
        for f in flags {
            leaf = leaf.flag(f);
        }
        let tree = CommandTree::new(CommandNode::new("root").subcommand(leaf)).unwrap();
        build_tools(&tree).remove(0)
    }

    #[test]
    fn greet_parameter_shape() {
        let spec = spec_for(vec![FlagDef::string("name", "Foo", "Name to greet")]);
        assert_eq!(spec.name, "leaf");
        assert_eq!(spec.description, "A leaf");
        let name = spec.parameter("name").unwrap();
        assert_eq!(name.kind, ParamType::String);
        assert_eq!(name.default, Some(json!("Foo")));
        assert!(!name.required);
        assert_eq!(name.description, "Name to greet");
    }

    #[test]
    fn type_mapping_table() {
        let spec = spec_for(vec![
            FlagDef::int("count", 7, ""),
            FlagDef::bool("force", true, ""),
            FlagDef::new("ratio", FlagKind::Float32, "0.25", ""),
            FlagDef::float("scale", 2.5, ""),
            FlagDef::new("ips", FlagKind::from_tag("ipSlice"), "[]", ""),
        ]);
        let p = |n: &str| spec.parameter(n).unwrap().clone();
        assert_eq!(p("count").kind, ParamType::Number);
        assert_eq!(p("count").default, Some(json!(7.0)));
        assert_eq!(p("force").kind, ParamType::Boolean);
        assert_eq!(p("force").default, Some(json!(true)));
        assert_eq!(p("ratio").kind, ParamType::Number);
        assert_eq!(p("ratio").default, Some(json!(0.25)));
        assert_eq!(p("scale").default, Some(json!(2.5)));
        assert_eq!(p("ips").kind, ParamType::String);
        assert_eq!(p("ips").default, None);
    }

    #[test]
    fn required_iff_default_is_empty() {
        let spec = spec_for(vec![
            FlagDef::string("token", "", "API token"),
            FlagDef::new("limit", FlagKind::Int, "", ""),
            FlagDef::string("name", "x", ""),
        ]);
        assert!(spec.parameter("token").unwrap().required);
        assert!(spec.parameter("limit").unwrap().required);
        assert!(!spec.parameter("name").unwrap().required);
        assert_eq!(spec.input_schema()["required"], json!(["token", "limit"]));
    }

    #[test]
    fn malformed_defaults_degrade_to_zero() {
        let spec = spec_for(vec![
            FlagDef::new("limit", FlagKind::Int, "lots", ""),
            FlagDef::new("force", FlagKind::Bool, "sure", ""),
        ]);
        assert_eq!(spec.parameter("limit").unwrap().default, Some(json!(0.0)));
        assert_eq!(spec.parameter("force").unwrap().default, Some(json!(false)));
        assert!(!spec.parameter("limit").unwrap().required);
    }

    #[test]
    fn bool_defaults_accept_the_boolish_vocabulary() {
        let spec = spec_for(vec![
            FlagDef::new("yes", FlagKind::Bool, "yes", ""),
            FlagDef::new("on", FlagKind::Bool, "ON", ""),
            FlagDef::new("off", FlagKind::Bool, "off", ""),
            FlagDef::new("t", FlagKind::Bool, "T", ""),
            FlagDef::new("maybe", FlagKind::Bool, "maybe", ""),
        ]);
        let default = |n: &str| spec.parameter(n).unwrap().default.clone();
        assert_eq!(default("yes"), Some(json!(true)));
        assert_eq!(default("on"), Some(json!(true)));
        assert_eq!(default("off"), Some(json!(false)));
        assert_eq!(default("t"), Some(json!(true)));
        assert_eq!(default("maybe"), Some(json!(false)));
    }

    #[test]
    fn input_schema_lists_properties_in_flag_order() {
        let spec = spec_for(vec![
            FlagDef::string("zeta", "z", ""),
            FlagDef::string("alpha", "a", ""),
        ]);
        let schema = spec.input_schema();
        assert_eq!(schema["type"], json!("object"));
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "args"]);
        assert_eq!(schema["properties"]["args"]["type"], json!("array"));
    }

    #[test]
    fn registration_record_serializes() {
        let spec = spec_for(vec![FlagDef::string("name", "Foo", "Name to greet")]);
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "leaf",
                "description": "A leaf",
                "parameters": [{
                    "name": "name",
                    "type": "string",
                    "description": "Name to greet",
                    "default": "Foo",
                    "required": false
                }]
            })
        );
    }

    #[test]
    fn to_tool_carries_name_and_schema() {
        let spec = spec_for(vec![FlagDef::string("name", "Foo", "")]);
        let tool = spec.to_tool();
        assert_eq!(tool.name, "leaf");
        assert_eq!(tool.input_schema["properties"]["name"]["default"], json!("Foo"));
    }
}
