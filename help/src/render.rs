//! Root and per-command help screens.

use clidef_core::{CliConfig, CommandGraph, HelpRenderer, OptionRecord, Result};
use tracing::debug;

use crate::format::{Row, format_rows};
use crate::options::{render_global_options, render_options};

fn title(config: &CliConfig) -> String {
    match &config.version {
        Some(version) => format!("{} v{version}", config.name),
        None => config.name.clone(),
    }
}

/// Renders the top-level help screen: title, usage, commands and global
/// options.
///
/// # Examples
///
/// ```
/// use clidef_core::{CliConfig, CommandDef};
/// use clidef_help::render_help;
///
/// let config = CliConfig::new("tool")
///     .with_version("1.0.0")
///     .with_command("build", CommandDef::new().with_description("Build it"));
///
/// let help = render_help(&config);
/// assert!(help.starts_with("tool v1.0.0\n\nUSAGE:\n  tool <command> [options]"));
/// assert!(help.contains("COMMANDS:\n  build  Build it"));
/// ```
pub fn render_help(config: &CliConfig) -> String {
    let mut lines = vec![
        title(config),
        String::new(),
        "USAGE:".to_string(),
        format!("  {} <command> [options]", config.name),
        String::new(),
        "COMMANDS:".to_string(),
    ];

    let rows: Vec<Row> = config
        .commands
        .iter()
        .map(|(name, def)| Row::new(name, def.description.clone().unwrap_or_default()))
        .collect();
    lines.extend(format_rows(&rows));
    lines.push(String::new());

    if !config.options.is_empty() {
        lines.push(render_global_options(&config.options));
        lines.push(String::new());
    }

    lines.push("(Use <command> --help for option details)".to_string());
    lines.join("\n")
}

/// Renders help for the command at `path`.
///
/// Global options appear unless the command opts out of them; options the
/// command redeclares are listed only under its own `OPTIONS:`.
///
/// # Errors
///
/// [`clidef_core::Error::CommandNotFound`] when `path` does not resolve.
pub fn render_command_help<S: AsRef<str>>(config: &CliConfig, path: &[S]) -> Result<String> {
    let resolved = CommandGraph::build(config).resolve(path)?;
    let target = &resolved.target;
    let display_path = resolved.display_path();
    debug!(command = %display_path, "rendering command help");

    let mut lines = vec![title(config), String::new(), "COMMAND:".to_string()];
    lines.extend(format_rows(&[Row::new(
        display_path.as_str(),
        target.description.clone().unwrap_or_default(),
    )]));
    lines.push(String::new());
    lines.push("USAGE:".to_string());
    lines.push(format!("  {} {display_path} [options]", config.name));
    lines.push(String::new());

    if !target.children.is_empty() {
        lines.push("SUBCOMMANDS:".to_string());
        let rows: Vec<Row> = target
            .children
            .iter()
            .map(|(name, child)| Row::new(name, child.description.clone().unwrap_or_default()))
            .collect();
        lines.extend(format_rows(&rows));
        lines.push(String::new());
    }

    if target.inherit_global {
        let inherited: OptionRecord = config
            .options
            .iter()
            .filter(|(name, _)| !target.options.contains_key(name))
            .map(|(name, schema)| (name.to_string(), schema.clone()))
            .collect();
        if !inherited.is_empty() {
            lines.push(render_global_options(&inherited));
            lines.push(String::new());
        }
    }

    lines.push(render_options(&target.options));
    Ok(lines.join("\n"))
}

/// [`HelpRenderer`] producing the plain-text screens of this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHelp;

impl HelpRenderer for PlainHelp {
    fn render_root(&self, config: &CliConfig) -> String {
        render_help(config)
    }

    fn render_command(&self, config: &CliConfig, path: &[String]) -> Result<String> {
        render_command_help(config, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clidef_core::{CommandDef, OptionSchema};

    #[test]
    fn test_title_without_version() {
        let help = render_help(&CliConfig::new("tool"));
        assert!(help.starts_with("tool\n\nUSAGE:"));
        assert!(!help.contains("GLOBAL OPTIONS:"));
        assert!(help.ends_with("(Use <command> --help for option details)"));
    }

    #[test]
    fn test_nested_path_in_usage() {
        let config = CliConfig::new("git").with_command(
            "remote",
            CommandDef::new().with_command("add", CommandDef::new().with_description("Add one")),
        );
        let help = render_command_help(&config, &["remote", "add"]).unwrap();
        assert!(help.contains("COMMAND:\n  remote add  Add one\n"));
        assert!(help.contains("USAGE:\n  git remote add [options]\n"));
        assert!(help.ends_with("(No options)"));
    }

    #[test]
    fn test_unknown_path_is_an_error() {
        let config = CliConfig::new("tool").with_command("build", CommandDef::new());
        let err = render_command_help(&config, &["deploy"]).unwrap_err();
        assert_eq!(err.code(), "E_COMMAND_NOT_FOUND");
    }

    #[test]
    fn test_plain_help_as_renderer() {
        let config = CliConfig::new("tool")
            .with_option("verbose", OptionSchema::flag())
            .with_command("build", CommandDef::new());
        let renderer: &dyn HelpRenderer = &PlainHelp;
        assert_eq!(renderer.render_root(&config), render_help(&config));
        assert_eq!(
            renderer
                .render_command(&config, &["build".to_string()])
                .unwrap(),
            render_command_help(&config, &["build"]).unwrap()
        );
    }
}
