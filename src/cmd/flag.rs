/*!
flag.rs - flag definitions attached to command nodes.

A flag is declared with a textual type tag and a textual default, the same
shape CLI help output shows:

  string            free text
  int               signed 64-bit integer
  bool              boolean (a bare `--flag` means true)
  float32 / float64 floating point
  anything else     accepted as free text

A flag whose default text is empty counts as required in tool schemas.
The argv parser itself always treats flags as optional.
*/

use std::fmt;

/// Type tag of a flag value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagKind {
    String,
    Int,
    Bool,
    Float32,
    Float64,
    /// Unrecognized tag, kept verbatim. Parsed as free text.
    Other(String),
}

impl FlagKind {
    /// Map a textual type tag onto a kind. Unknown tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => FlagKind::String,
            "int" => FlagKind::Int,
            "bool" => FlagKind::Bool,
            "float32" => FlagKind::Float32,
            "float64" => FlagKind::Float64,
            other => FlagKind::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            FlagKind::String => "string",
            FlagKind::Int => "int",
            FlagKind::Bool => "bool",
            FlagKind::Float32 => "float32",
            FlagKind::Float64 => "float64",
            FlagKind::Other(tag) => tag,
        }
    }

    /// Whether `text` is a well-formed value of this kind.
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            FlagKind::Int => text.trim().parse::<i64>().is_ok(),
            FlagKind::Bool => parse_bool(text).is_some(),
            FlagKind::Float32 => text.trim().parse::<f32>().is_ok(),
            FlagKind::Float64 => text.trim().parse::<f64>().is_ok(),
            FlagKind::String | FlagKind::Other(_) => true,
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parse boolean text the way the argv parser does (`BoolishValueParser`).
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// A named, typed, optionally defaulted flag owned by one command node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDef {
    pub name: String,
    pub kind: FlagKind,
    /// Default value as text. Empty means "no default".
    pub default: String,
    pub usage: String,
}

impl FlagDef {
    pub fn new(
        name: impl Into<String>,
        kind: FlagKind,
        default: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            default: default.into(),
            usage: usage.into(),
        }
    }

    pub fn string(name: impl Into<String>, default: &str, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String, default, usage)
    }

    pub fn int(name: impl Into<String>, default: i64, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Int, default.to_string(), usage)
    }

    pub fn bool(name: impl Into<String>, default: bool, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Bool, default.to_string(), usage)
    }

    pub fn float(name: impl Into<String>, default: f64, usage: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Float64, default.to_string(), usage)
    }

    pub fn is_defaulted(&self) -> bool {
        !self.default.is_empty()
    }

    /// Required from the schema's point of view: no default text.
    ///
    /// A flag whose real default is the empty string is indistinguishable
    /// from one without a default and is therefore always required.
    pub fn is_required(&self) -> bool {
        !self.is_defaulted()
    }
}

/// Which definition wins when a command and one of its ancestors declare
/// a flag with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagPrecedence {
    /// The ancestor's definition wins; the root-most one if several do.
    #[default]
    Inherited,
    /// The command's own definition shadows inherited ones.
    Local,
}
