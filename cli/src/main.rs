use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clidef_core::{
    Cli as DefinedCli, CliConfig, CommandHandler, ExecutionContext, Hook, Outcome, RunError,
};
use clidef_help::{PlainHelp, render_command_help, render_help};
use clidef_loader::{load_config, load_config_file, sample_config_hint};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "clidef")]
#[command(about = "Run and inspect declarative CLI definitions")]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the defined CLI; each command prints its execution context as JSON.
    Exec(RunArgs),
    /// Build the execution context and print it with the relaxed-scan diagnostics.
    Inspect(RunArgs),
    /// Check the configuration for option conflicts.
    Check(SourceArgs),
    /// Render help for the defined CLI or one of its commands.
    Help(HelpArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Configuration file (JSON or YAML).
    #[arg(long, conflicts_with = "dir")]
    config: Option<PathBuf>,
    /// Directory searched for clidef.config.{json,yaml,yml} (default: current directory).
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Argument vector for the defined CLI, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Command path (e.g. `remote add`); empty for the root screen.
    path: Vec<String>,
}

/// Why a subcommand failed.
#[derive(Debug)]
enum Failure {
    /// Loading or serialization problem, printed after `error: `.
    Message(String),
    /// Error from the defined CLI, already formatted as `[CODE] message`.
    Report(String),
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

impl From<RunError> for Failure {
    fn from(err: RunError) -> Self {
        Failure::Report(err.report())
    }
}

impl From<clidef_core::Error> for Failure {
    fn from(err: clidef_core::Error) -> Self {
        RunError::from(err).into()
    }
}

/// Logs each dispatch of the defined CLI.
struct TraceHook;

impl Hook for TraceHook {
    fn name(&self) -> &str {
        "trace"
    }

    fn on_register(&self, config: &CliConfig) {
        debug!(cli = %config.name, commands = config.command_count(), "configuration registered");
    }

    fn on_parse(&self, argv: &[String]) {
        debug!(argc = argv.len(), "parsing argument vector");
    }

    fn before_run(&self, ctx: &ExecutionContext) {
        ctx.logger.debug("running");
    }

    fn after_run(&self, ctx: &ExecutionContext, output: Option<&str>) {
        ctx.logger
            .debug(&format!("finished, {} bytes of output", output.map_or(0, str::len)));
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let result = match cli.command {
        Command::Exec(args) => run_exec(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Check(args) => run_check(args),
        Command::Help(args) => run_help(args),
    };

    match result {
        Ok(()) => {}
        Err(Failure::Message(message)) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
        Err(Failure::Report(report)) => {
            eprintln!("{report}");
            std::process::exit(1);
        }
    }
}

fn setup_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init();
}

fn run_exec(args: RunArgs) -> Result<(), Failure> {
    let config = load_source(&args.source)?.with_default_handler(CommandHandler::new(|ctx| {
        Ok(Some(serde_json::to_string_pretty(ctx)?))
    }));

    let mut cli = DefinedCli::new(config)?.with_help_renderer(PlainHelp);
    cli.register_hook(TraceHook);

    match cli.execute(&args.args)? {
        Outcome::Version(text) | Outcome::Help(text) => println!("{text}"),
        Outcome::Completed(Some(output)) => println!("{output}"),
        Outcome::Completed(None) => {}
    }
    Ok(())
}

fn run_inspect(args: RunArgs) -> Result<(), Failure> {
    let config = load_source(&args.source)?;
    let cli = DefinedCli::new(config)?;
    let built = cli.build_context(&args.args)?;

    let raw = serde_json::to_string_pretty(&built)
        .map_err(|err| format!("Failed to serialize execution context: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn run_check(args: SourceArgs) -> Result<(), Failure> {
    let config = load_source(&args)?;
    let cli = DefinedCli::new(config)?;
    println!(
        "Configuration '{}' is valid: {} command(s), {} global option(s).",
        cli.config().name,
        cli.config().command_count(),
        cli.config().options.len()
    );
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), Failure> {
    let config = load_source(&args.source)?;
    let text = if args.path.is_empty() {
        render_help(&config)
    } else {
        render_command_help(&config, &args.path)?
    };
    println!("{text}");
    Ok(())
}

fn load_source(source: &SourceArgs) -> Result<CliConfig, String> {
    if let Some(path) = &source.config {
        return load_config_file(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()));
    }

    let dir = source.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    match load_config(&dir) {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Err(sample_config_hint()),
        Err(err) => Err(format!(
            "Failed to load configuration from '{}': {err}",
            dir.display()
        )),
    }
}
