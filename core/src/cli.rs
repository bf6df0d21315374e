//! CLI instances and dispatch.
//!
//! [`Cli::new`] checks the configuration once for option conflicts and caches
//! the command graph. [`Cli::execute`] handles `--version` and `--help`,
//! builds the execution context and calls the target's handler;
//! [`Cli::run`] does the same and maps the outcome to an exit code.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::{BuiltContext, build_with_graph, env_snapshot};
use crate::error::{Error, Result};
use crate::graph::CommandGraph;
use crate::hooks::{Hook, HookManager};
use crate::ordered::OrderedMap;
use crate::parser::is_option_like;
use crate::schema::{OptionKind, OptionRecord, normalize_option_record};
use crate::types::{CliConfig, CommandDef, HandlerError};

/// Presentation of help text. Implemented outside the core.
pub trait HelpRenderer: Send + Sync {
    fn render_root(&self, config: &CliConfig) -> String;

    /// # Errors
    ///
    /// [`Error::CommandNotFound`] when `path` does not resolve.
    fn render_command(&self, config: &CliConfig, path: &[String]) -> Result<String>;
}

/// What a successful [`Cli::execute`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `--version` line.
    Version(String),
    Help(String),
    /// Handler ran; holds whatever text it returned.
    Completed(Option<String>),
}

/// Dispatch failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("Command has no run() handler.")]
    NoHandler { path: String },

    #[error("{0}")]
    Handler(HandlerError),
}

impl RunError {
    pub fn code(&self) -> &'static str {
        match self {
            RunError::Core(err) => err.code(),
            RunError::NoHandler { .. } => "E_NO_HANDLER",
            RunError::Handler(_) => "E_HANDLER",
        }
    }

    /// Line printed to stderr by [`Cli::run`].
    pub fn report(&self) -> String {
        match self {
            RunError::Core(err) => format!("[{}] {}", err.code(), err),
            other => other.to_string(),
        }
    }
}

/// Checks a configuration for conflicting option declarations.
///
/// For every command that inherits global options, an option sharing a
/// global name must have the same kind, and its aliases must not be bound to
/// a different global option. Within any single scope an alias may be used by
/// one option only, and enum options must declare at least one choice.
///
/// # Errors
///
/// The first [`Error::OptionConflict`] found.
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
///         CommandDef::new().with_option("version", OptionSchema::string().with_alias('v')),
///     );
///
/// let err = check_option_conflicts(&config).unwrap_err();
/// assert_eq!(err.code(), "E_OPTION_CONFLICT");
/// assert_eq!(
///     err.to_string(),
///     "Option conflict 'version': alias '-v' collides with global option 'verbose'"
/// );
/// ```
pub fn check_option_conflicts(config: &CliConfig) -> Result<()> {
    let global = normalize_option_record(&config.options);
    check_scope(&global, "global options")?;

    let mut global_aliases: HashMap<char, &str> = HashMap::new();
    for (name, schema) in global.iter() {
        for alias in &schema.alias {
            global_aliases.insert(*alias, name);
        }
    }

    let mut path = Vec::new();
    check_commands(&config.commands, &mut path, &global, &global_aliases)
}

fn check_scope(record: &OptionRecord, scope: &str) -> Result<()> {
    let mut seen: HashMap<char, &str> = HashMap::new();
    for (name, schema) in record.iter() {
        if let OptionKind::Enum(opt) = &schema.kind {
            if opt.choices.is_empty() {
                return Err(Error::conflict(name, format!("enum has no choices in {scope}")));
            }
        }
        for alias in &schema.alias {
            if let Some(other) = seen.insert(*alias, name) {
                return Err(Error::conflict(
                    name,
                    format!("alias '-{alias}' already used by '{other}' in {scope}"),
                ));
            }
        }
    }
    Ok(())
}

fn check_commands<'a>(
    commands: &'a OrderedMap<CommandDef>,
    path: &mut Vec<&'a str>,
    global: &OptionRecord,
    global_aliases: &HashMap<char, &str>,
) -> Result<()> {
    for (name, def) in commands.iter() {
        path.push(name);
        let label = path.join(" ");
        let options = normalize_option_record(&def.options);
        check_scope(&options, &format!("command '{label}'"))?;

        if def.inherit_global {
            for (opt_name, schema) in options.iter() {
                if let Some(global_schema) = global.get(opt_name) {
                    if global_schema.kind_name() != schema.kind_name() {
                        return Err(Error::conflict(
                            opt_name,
                            format!("kind mismatch in command '{label}'"),
                        ));
                    }
                }
                for alias in &schema.alias {
                    match global_aliases.get(alias) {
                        Some(existing) if *existing != opt_name => {
                            return Err(Error::conflict(
                                opt_name,
                                format!("alias '-{alias}' collides with global option '{existing}'"),
                            ));
                        }
                        _ => {}
                    }
                }
            }
        }

        check_commands(&def.commands, path, global, global_aliases)?;
        path.pop();
    }
    Ok(())
}

/// A checked, ready-to-run CLI.
///
/// `Cli` holds no per-invocation state, so one instance can serve any number
/// of [`execute`](Cli::execute) calls, including from several threads.
///
/// # Examples
///
/// ```
/// use clidef_core::*;
///
/// let config = CliConfig::new("tool")
///     .with_version("0.3.0")
///     .with_command(
///         "greet",
///         CommandDef::new()
///             .with_option("name", OptionSchema::string().required())
///             .with_handler(|ctx| {
///                 let name = ctx.get("name").and_then(|v| v.as_str()).unwrap_or_default();
///                 Ok(Some(format!("hello {name}")))
///             }),
///     );
/// let cli = Cli::new(config).unwrap();
///
/// assert_eq!(
///     cli.execute(&["greet", "--name=ada"]).unwrap(),
///     Outcome::Completed(Some("hello ada".to_string()))
/// );
/// assert_eq!(
///     cli.execute(&["greet", "-V"]).unwrap(),
///     Outcome::Version("tool 0.3.0".to_string())
/// );
/// assert_eq!(cli.execute(&["greet"]).unwrap_err().code(), "E_VALIDATE");
/// ```
pub struct Cli {
    config: CliConfig,
    graph: CommandGraph,
    hooks: HookManager,
    help: Option<Box<dyn HelpRenderer>>,
}

impl Cli {
    /// # Errors
    ///
    /// [`Error::OptionConflict`] from [`check_option_conflicts`].
    pub fn new(config: CliConfig) -> Result<Self> {
        check_option_conflicts(&config)?;
        let graph = CommandGraph::build(&config);
        debug!(
            cli = %config.name,
            commands = config.command_count(),
            "cli constructed"
        );
        Ok(Self {
            config,
            graph,
            hooks: HookManager::new(),
            help: None,
        })
    }

    /// Enables `--help`/`-h` handling.
    pub fn with_help_renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.help = Some(Box::new(renderer));
        self
    }

    pub fn register_hook(&mut self, hook: impl Hook + 'static) {
        self.hooks.register(Box::new(hook), &self.config);
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn graph(&self) -> &CommandGraph {
        &self.graph
    }

    pub fn hooks(&self) -> &HookManager {
        &self.hooks
    }

    /// `"<name> <version>"`, with `(no version)` when none is set.
    pub fn version_line(&self) -> String {
        format!(
            "{} {}",
            self.config.name,
            self.config.version.as_deref().unwrap_or("(no version)")
        )
    }

    /// Builds the execution context without dispatching.
    pub fn build_context<S: AsRef<str>>(&self, argv: &[S]) -> Result<BuiltContext> {
        build_with_graph(&self.graph, &self.config, argv, env_snapshot())
    }

    /// Runs one invocation.
    ///
    /// With a help renderer installed, `--help`/`-h` anywhere before a `--`
    /// terminator wins over everything else; the non-option tokens in front
    /// of it select the command whose help is shown, and a path that does
    /// not resolve shows root help. `--version`/`-V` comes next.
    ///
    /// # Errors
    ///
    /// [`RunError::Core`] when the context cannot be built,
    /// [`RunError::NoHandler`] when the command has no handler, and
    /// [`RunError::Handler`] when the handler fails.
    pub fn execute<S: AsRef<str>>(&self, argv: &[S]) -> std::result::Result<Outcome, RunError> {
        let argv: Vec<String> = argv.iter().map(|s| s.as_ref().to_string()).collect();
        let options_end = argv.iter().position(|t| t == "--").unwrap_or(argv.len());
        let head = &argv[..options_end];

        if let Some(renderer) = &self.help {
            if let Some(pos) = head.iter().position(|t| t == "--help" || t == "-h") {
                let path: Vec<String> = head[..pos]
                    .iter()
                    .take_while(|t| !is_option_like(t))
                    .cloned()
                    .collect();
                return Ok(Outcome::Help(self.render_help(renderer.as_ref(), &path)));
            }
        }

        if head.iter().any(|t| t == "--version" || t == "-V") {
            return Ok(Outcome::Version(self.version_line()));
        }

        self.hooks.emit_parse(&argv);
        let ctx = build_with_graph(&self.graph, &self.config, &argv, env_snapshot())?.context;
        let path = ctx.command.display_path();

        let Some(handler) = ctx.command.target.run.clone() else {
            warn!(command = %path, "command has no run handler");
            return Err(RunError::NoHandler { path });
        };

        info!(command = %path, args = ctx.args.len(), "dispatching command");
        self.hooks.emit_before_run(&ctx);
        let output = handler.call(&ctx).map_err(RunError::Handler)?;
        self.hooks.emit_after_run(&ctx, output.as_deref());
        Ok(Outcome::Completed(output))
    }

    /// Runs one invocation, printing the outcome. Returns the exit code.
    pub fn run<S: AsRef<str>>(&self, argv: &[S]) -> i32 {
        match self.execute(argv) {
            Ok(Outcome::Version(text)) | Ok(Outcome::Help(text)) => {
                println!("{text}");
                0
            }
            Ok(Outcome::Completed(output)) => {
                if let Some(output) = output {
                    println!("{output}");
                }
                0
            }
            Err(err) => {
                eprintln!("{}", err.report());
                1
            }
        }
    }

    fn render_help(&self, renderer: &dyn HelpRenderer, path: &[String]) -> String {
        if path.is_empty() {
            return renderer.render_root(&self.config);
        }
        match renderer.render_command(&self.config, path) {
            Ok(text) => text,
            Err(err) => {
                debug!(error = %err, "help path did not resolve, showing root help");
                renderer.render_root(&self.config)
            }
        }
    }
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("name", &self.config.name)
            .field("hooks", &self.hooks)
            .field("help", &self.help.is_some())
            .finish()
    }
}
