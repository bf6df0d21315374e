//! Value and configuration types.
//!
//! [`CliConfig`] and [`CommandDef`] are the declarative input: a named CLI
//! with global options and a tree of commands. They can be built in code or
//! deserialized from JSON/YAML with [`serde`]; handlers are attached in code
//! only.
//!
//! [`OptionValue`] is the coerced value of one option after parsing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::ordered::OrderedMap;
use crate::schema::{OptionRecord, OptionSchema};

/// Numeric option value.
///
/// Integers stay integers: a default of `4` is reported as `Integer(4)`, never
/// `Float(4.0)`. Mixed comparisons go through `f64`.
///
/// # Examples
///
/// ```
/// use clidef_core::Number;
///
/// assert_eq!(Number::parse("4"), Some(Number::Integer(4)));
/// assert_eq!(Number::parse("2.5"), Some(Number::Float(2.5)));
/// assert_eq!(Number::parse("abc"), None);
/// assert_eq!(Number::Integer(4), Number::Float(4.0));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Parses decimal text, preferring an integer reading.
    ///
    /// Surrounding whitespace is ignored. Empty text and `NaN` yield `None`,
    /// and infinity is only read from the exact spelling `Infinity`.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
        if unsigned == "Infinity" {
            return Some(Number::Float(if text.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }));
        }
        if unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity") {
            return None;
        }
        if let Ok(n) = text.parse::<i64>() {
            return Some(Number::Integer(n));
        }
        match text.parse::<f64>() {
            Ok(n) if !n.is_nan() => Some(Number::Float(n)),
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Number::Float(n) if n.is_nan())
    }

    /// Whether the value has no fractional part.
    pub fn is_integral(self) -> bool {
        match self {
            Number::Integer(_) => true,
            Number::Float(n) => n.is_finite() && n.fract() == 0.0,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Float(n) => write!(f, "{n}"),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Integer(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Integer(n.into())
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

/// Coerced option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(Number),
    String(String),
}

/// Parsed option values, in the order they were recorded.
pub type OptionValues = OrderedMap<OptionValue>;

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
            OptionValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<Number> for OptionValue {
    fn from(n: Number) -> Self {
        OptionValue::Number(n)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Number(Number::Integer(n))
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Number(Number::from(n))
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(Number::Float(n))
    }
}

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// What a handler returns: optional text to print, or an error.
pub type HandlerResult = std::result::Result<Option<String>, HandlerError>;

/// Shared reference to a command's `run` function.
#[derive(Clone)]
pub struct CommandHandler(Arc<dyn Fn(&ExecutionContext) -> HandlerResult + Send + Sync>);

impl CommandHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> HandlerResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &ExecutionContext) -> HandlerResult {
        (self.0)(ctx)
    }
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CommandHandler(..)")
    }
}

/// Declaration of one command and its nested subcommands.
///
/// # Examples
///
/// ```
/// use clidef_core::{CommandDef, OptionSchema};
///
/// let build = CommandDef::new()
///     .with_description("Build the project")
///     .with_option("threads", OptionSchema::number().required())
///     .with_command("docs", CommandDef::new());
///
/// assert!(build.inherit_global);
/// assert_eq!(build.options.len(), 1);
/// assert!(build.commands.contains_key("docs"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub options: OptionRecord,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub commands: OrderedMap<CommandDef>,
    /// When `false`, root-level global options are not merged in.
    #[serde(default = "default_true")]
    pub inherit_global: bool,
    #[serde(skip)]
    pub run: Option<CommandHandler>,
}

impl Default for CommandDef {
    fn default() -> Self {
        Self {
            description: None,
            options: OptionRecord::new(),
            commands: OrderedMap::new(),
            inherit_global: true,
            run: None,
        }
    }
}

impl CommandDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_option(mut self, name: &str, schema: OptionSchema) -> Self {
        self.options.insert(name, schema);
        self
    }

    pub fn with_command(mut self, name: &str, def: CommandDef) -> Self {
        self.commands.insert(name, def);
        self
    }

    /// Stops root-level global options from applying to this command.
    pub fn without_global_options(mut self) -> Self {
        self.inherit_global = false;
        self
    }

    pub fn with_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> HandlerResult + Send + Sync + 'static,
    {
        self.run = Some(CommandHandler::new(f));
        self
    }

    fn fill_handler(&mut self, handler: &CommandHandler) {
        if self.run.is_none() {
            self.run = Some(handler.clone());
        }
        for (_, child) in self.commands.iter_mut() {
            child.fill_handler(handler);
        }
    }
}

/// Top-level CLI configuration.
///
/// # Examples
///
/// ```
/// use clidef_core::{CliConfig, CommandDef, OptionSchema};
///
/// let config = CliConfig::new("tool")
///     .with_version("1.2.0")
///     .with_option("verbose", OptionSchema::flag().with_alias('v'))
///     .with_command("build", CommandDef::new().with_command("docs", CommandDef::new()));
///
/// assert_eq!(config.command_count(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Global options, available to every command that inherits them.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub options: OptionRecord,
    #[serde(default)]
    pub commands: OrderedMap<CommandDef>,
}

impl CliConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_option(mut self, name: &str, schema: OptionSchema) -> Self {
        self.options.insert(name, schema);
        self
    }

    pub fn with_command(mut self, name: &str, def: CommandDef) -> Self {
        self.commands.insert(name, def);
        self
    }

    /// Attaches `handler` to every command that has none.
    pub fn with_default_handler(mut self, handler: CommandHandler) -> Self {
        for (_, def) in self.commands.iter_mut() {
            def.fill_handler(&handler);
        }
        self
    }

    /// Total number of commands at every depth.
    pub fn command_count(&self) -> usize {
        fn count(commands: &OrderedMap<CommandDef>) -> usize {
            commands.values().map(|def| 1 + count(&def.commands)).sum()
        }
        count(&self.commands)
    }
}

fn default_true() -> bool {
    true
}
