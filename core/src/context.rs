//! Execution context construction.
//!
//! [`build_context`] turns a configuration and an argument vector into a
//! validated [`ExecutionContext`]:
//!
//! 1. relaxed scan of the whole argv against the global options,
//! 2. greedy discovery of the command path from the front of argv,
//! 3. strict parse of the remaining tokens against the merged schema
//!    (global overlaid by command, unless the command opts out),
//! 4. reconciliation of early global values with strict values (strict wins),
//! 5. split into global/command/final views and validation of each scope,
//! 6. slicing of the positional arguments that follow the options.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{EMPTY_PATH_MARKER, Error, Result};
use crate::graph::{CommandGraph, ResolvedCommand};
use crate::parser::{ParsedArgv, count_option_tokens, parse_argv, parse_options};
use crate::schema::{OptionRecord, normalize_option_record};
use crate::types::{CliConfig, OptionValue, OptionValues};
use crate::validate::validate_option_values;

/// Logging handle given to command handlers.
///
/// Events go through [`tracing`] and carry the command path as a field.
#[derive(Debug, Clone)]
pub struct Logger {
    command: String,
}

impl Logger {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn info(&self, message: &str) {
        info!(command = %self.command, "{message}");
    }

    pub fn warn(&self, message: &str) {
        warn!(command = %self.command, "{message}");
    }

    pub fn error(&self, message: &str) {
        error!(command = %self.command, "{message}");
    }

    pub fn debug(&self, message: &str) {
        debug!(command = %self.command, "{message}");
    }
}

/// Everything a command handler receives.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionContext {
    /// The argument vector as given.
    pub argv: Vec<String>,
    pub command: ResolvedCommand,
    /// Positional arguments after the command's options.
    pub args: Vec<String>,
    /// Global values overlaid by command values.
    pub options: OptionValues,
    pub global_options: OptionValues,
    pub command_options: OptionValues,
    /// Schema the options were parsed against.
    #[serde(skip)]
    pub schema: OptionRecord,
    #[serde(skip)]
    pub env: BTreeMap<String, String>,
    #[serde(skip)]
    pub logger: Logger,
}

impl ExecutionContext {
    /// The value given on the command line, if any.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// The given value, falling back to the schema default.
    pub fn value_or_default(&self, name: &str) -> Option<OptionValue> {
        self.options
            .get(name)
            .cloned()
            .or_else(|| self.schema.get(name)?.default_value())
    }

    /// Flag value with its default applied; `false` for unknown names.
    pub fn flag(&self, name: &str) -> bool {
        self.value_or_default(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }
}

/// A built context plus the relaxed pre-scan, kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltContext {
    pub context: ExecutionContext,
    pub parsed: ParsedArgv,
}

/// Snapshot of the process environment. Entries that are not valid UTF-8
/// are left out.
pub fn env_snapshot() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Builds the execution context for `argv`, snapshotting the process
/// environment.
///
/// # Errors
///
/// Any [`Error`] from resolution, parsing or validation. Option conflicts
/// are not checked here; see [`Cli::new`](crate::Cli::new).
///
/// # Examples
///
/// ```
/// use clidef_core::*;
///
/// let config = CliConfig::new("tool")
///     .with_option("verbose", OptionSchema::flag().with_alias('v'))
///     .with_command(
///         "build",
///         CommandDef::new().with_option("threads", OptionSchema::number().required()),
///     );
///
/// let built = build_context(&config, &["build", "-v", "--threads=4", "src"]).unwrap();
/// let ctx = &built.context;
/// assert_eq!(ctx.command.display_path(), "build");
/// assert_eq!(ctx.args, vec!["src"]);
/// assert_eq!(ctx.global_options.get("verbose"), Some(&OptionValue::Bool(true)));
/// assert_eq!(ctx.command_options.get("threads"), Some(&OptionValue::from(4)));
/// ```
pub fn build_context<S: AsRef<str>>(config: &CliConfig, argv: &[S]) -> Result<BuiltContext> {
    build_context_with_env(config, argv, env_snapshot())
}

/// Same as [`build_context`] with an explicit environment snapshot.
pub fn build_context_with_env<S: AsRef<str>>(
    config: &CliConfig,
    argv: &[S],
    env: BTreeMap<String, String>,
) -> Result<BuiltContext> {
    let graph = CommandGraph::build(config);
    build_with_graph(&graph, config, argv, env)
}

pub(crate) fn build_with_graph<S: AsRef<str>>(
    graph: &CommandGraph,
    config: &CliConfig,
    argv: &[S],
    env: BTreeMap<String, String>,
) -> Result<BuiltContext> {
    let global_schema = normalize_option_record(&config.options);
    let parsed = parse_argv(argv, &global_schema)?;

    let first: &str = match argv.first() {
        Some(token) => token.as_ref(),
        None => return Err(Error::command_not_found(vec![EMPTY_PATH_MARKER.to_string()])),
    };

    let path_len = discover_path_len(graph, argv);
    let resolved = if path_len == 0 && !first.starts_with('-') {
        graph.resolve(&argv[..1])?
    } else {
        graph.resolve(&argv[..path_len])?
    };
    let tail = &argv[path_len..];
    debug!(
        path = %resolved.display_path(),
        tail = tail.len(),
        "resolved command path"
    );

    let target = &resolved.target;
    let inherit = target.inherit_global;
    let command_schema = &target.options;
    let merged_schema = if inherit {
        global_schema.overlay(command_schema)
    } else {
        command_schema.clone()
    };

    let parsed_merged = parse_options(tail, &merged_schema)?;

    // Strict values win over the early relaxed capture.
    let mut pre_global = if inherit {
        parsed.options.clone()
    } else {
        OptionValues::new()
    };
    for name in parsed_merged.keys() {
        if pre_global.remove(name).is_some() {
            debug!(option = name, "strict value replaces pre-path value");
        }
    }

    let mut global_values = OptionValues::new();
    if inherit {
        for name in global_schema.keys() {
            if let Some(value) = pre_global.get(name).or_else(|| parsed_merged.get(name)) {
                global_values.insert(name, value.clone());
            }
        }
    }
    let command_values: OptionValues = command_schema
        .keys()
        .filter_map(|name| {
            parsed_merged
                .get(name)
                .map(|value| (name.to_string(), value.clone()))
        })
        .collect();
    let final_values = global_values.overlay(&command_values);

    if inherit && !global_schema.is_empty() {
        validate_option_values(&global_schema, &global_values)?;
    }
    if !command_schema.is_empty() {
        validate_option_values(command_schema, &command_values)?;
    }

    let consumed = count_option_tokens(tail);
    let args: Vec<String> = tail[consumed..]
        .iter()
        .map(|s| s.as_ref().to_string())
        .collect();

    debug!(
        options = final_values.len(),
        args = args.len(),
        "execution context built"
    );

    let logger = Logger::new(resolved.display_path());
    let context = ExecutionContext {
        argv: argv.iter().map(|s| s.as_ref().to_string()).collect(),
        command: resolved,
        args,
        options: final_values,
        global_options: global_values,
        command_options: command_values,
        schema: merged_schema,
        env,
        logger,
    };

    Ok(BuiltContext { context, parsed })
}

/// Number of leading argv tokens that form a resolvable command path.
///
/// Stops at the first option-like token or the first token that does not
/// extend the path.
fn discover_path_len<S: AsRef<str>>(graph: &CommandGraph, argv: &[S]) -> usize {
    let mut len = 0;
    while len < argv.len() {
        if argv[len].as_ref().starts_with('-') || graph.resolve(&argv[..=len]).is_err() {
            break;
        }
        len += 1;
    }
    len
}
