//! Command resolution, option parsing and validation for declarative CLIs.
//!
//! A CLI is described by a [`CliConfig`]: a name, optional version, global
//! options, and a tree of [`CommandDef`]s, each with its own options and an
//! optional handler. From that description this crate:
//!
//! - resolves the command path at the front of an argument vector
//!   ([`CommandGraph`]),
//! - parses `--long`, `--long=value`, `--no-flag`, `-abc` and `--` tokens
//!   against typed option schemas ([`parse_argv`], [`parse_options`]),
//! - validates the parsed values ([`validate_option_values`]),
//! - assembles an [`ExecutionContext`] for the handler ([`build_context`]),
//! - and dispatches it ([`Cli`]), with lifecycle [`Hook`]s and a pluggable
//!   [`HelpRenderer`].
//!
//! Option kinds form a closed set ([`OptionKind`]): flag, string, number and
//! enum. Every failure is an [`Error`] with a stable [`Error::code`].
//!
//! # Example
//!
//! ```
//! use clidef_core::*;
//!
//! let config = CliConfig::new("tool")
//!     .with_option("verbose", OptionSchema::flag().with_alias('v'))
//!     .with_command(
//!         "build",
//!         CommandDef::new()
//!             .with_option(
//!                 "threads",
//!                 OptionSchema::new(NumberOption::new().with_min(1.0).with_max(8.0)).required(),
//!             )
//!             .with_option("mode", OptionSchema::enumeration(["dev", "prod"]).required()),
//!     );
//!
//! let built = build_context(&config, &["build", "--threads=4", "--mode=dev", "--verbose"]).unwrap();
//! let options = &built.context.options;
//! assert_eq!(options.get("threads"), Some(&OptionValue::from(4)));
//! assert_eq!(options.get("mode"), Some(&OptionValue::from("dev")));
//! assert_eq!(options.get("verbose"), Some(&OptionValue::Bool(true)));
//!
//! let err = build_context(&config, &["build", "--threads=0", "--mode=dev"]).unwrap_err();
//! assert_eq!(err.code(), "E_VALIDATE");
//! ```

mod cli;
mod context;
mod error;
mod graph;
mod hooks;
mod ordered;
mod parser;
mod schema;
mod types;
mod validate;

pub use cli::{Cli, HelpRenderer, Outcome, RunError, check_option_conflicts};
pub use context::{
    BuiltContext, ExecutionContext, Logger, build_context, build_context_with_env, env_snapshot,
};
pub use error::{EMPTY_PATH_MARKER, Error, ParseError, Result, ValidationError};
pub use graph::{CommandGraph, CommandNode, ResolvedCommand};
pub use hooks::{Hook, HookManager};
pub use ordered::OrderedMap;
pub use parser::{ParsedArgv, is_option_like, parse_argv, parse_options};
pub use schema::{
    EnumOption, FlagOption, NumberOption, OptionKind, OptionRecord, OptionSchema, Pattern,
    StringOption, normalize_option_record,
};
pub use types::{
    CliConfig, CommandDef, CommandHandler, HandlerError, HandlerResult, Number, OptionValue,
    OptionValues,
};
pub use validate::validate_option_values;
