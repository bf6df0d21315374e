//! Immutable command tree and path resolution.
//!
//! [`CommandGraph::build`] mirrors the nested `commands` tables of a
//! [`CliConfig`] and records each node's depth. [`CommandGraph::resolve`]
//! walks path segments greedily from the roots and never backtracks.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{EMPTY_PATH_MARKER, Error, Result};
use crate::ordered::OrderedMap;
use crate::schema::{OptionRecord, normalize_option_record};
use crate::types::{CliConfig, CommandDef, CommandHandler};

/// A registered command.
#[derive(Debug)]
pub struct CommandNode {
    pub name: String,
    pub description: Option<String>,
    /// The command's own options, normalized.
    pub options: OptionRecord,
    pub inherit_global: bool,
    pub children: OrderedMap<Arc<CommandNode>>,
    /// 0 for root commands.
    pub depth: usize,
    pub run: Option<CommandHandler>,
}

impl CommandNode {
    fn from_def(name: &str, def: &CommandDef, depth: usize) -> Self {
        let children = def
            .commands
            .iter()
            .map(|(child, child_def)| {
                (
                    child.to_string(),
                    Arc::new(CommandNode::from_def(child, child_def, depth + 1)),
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            description: def.description.clone(),
            options: normalize_option_record(&def.options),
            inherit_global: def.inherit_global,
            children,
            depth,
            run: def.run.clone(),
        }
    }
}

/// Root commands of a configuration.
///
/// # Examples
///
/// ```
/// use clidef_core::{CliConfig, CommandDef, CommandGraph};
///
/// let config = CliConfig::new("git")
///     .with_command("remote", CommandDef::new().with_command("add", CommandDef::new()));
/// let graph = CommandGraph::build(&config);
///
/// let resolved = graph.resolve(&["remote", "add"]).unwrap();
/// assert_eq!(resolved.names(), vec!["remote", "add"]);
/// assert_eq!(resolved.target.depth, 1);
///
/// let err = graph.resolve(&["remote", "rename"]).unwrap_err();
/// assert_eq!(err.to_string(), "Command not found: remote rename");
/// ```
#[derive(Debug, Default)]
pub struct CommandGraph {
    roots: OrderedMap<Arc<CommandNode>>,
}

impl CommandGraph {
    pub fn build(config: &CliConfig) -> Self {
        let roots = config
            .commands
            .iter()
            .map(|(name, def)| (name.to_string(), Arc::new(CommandNode::from_def(name, def, 0))))
            .collect();
        Self { roots }
    }

    pub fn roots(&self) -> &OrderedMap<Arc<CommandNode>> {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Resolves `parts` to a command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandNotFound`] carrying the matched prefix plus the
    /// first unmatched segment, or `["<empty>"]` when `parts` is empty.
    pub fn resolve<S: AsRef<str>>(&self, parts: &[S]) -> Result<ResolvedCommand> {
        let mut path: Vec<Arc<CommandNode>> = Vec::new();
        let mut level = &self.roots;

        for part in parts {
            let Some(node) = level.get(part.as_ref()) else {
                break;
            };
            path.push(Arc::clone(node));
            level = &node.children;
        }

        if path.len() < parts.len() {
            let failing = path
                .iter()
                .map(|node| node.name.clone())
                .chain(std::iter::once(parts[path.len()].as_ref().to_string()))
                .collect();
            return Err(Error::command_not_found(failing));
        }

        match path.last().cloned() {
            Some(target) => Ok(ResolvedCommand { path, target }),
            None => Err(Error::command_not_found(vec![
                EMPTY_PATH_MARKER.to_string(),
            ])),
        }
    }
}

/// A resolved command path, root first.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub path: Vec<Arc<CommandNode>>,
    pub target: Arc<CommandNode>,
}

impl ResolvedCommand {
    pub fn names(&self) -> Vec<&str> {
        self.path.iter().map(|node| node.name.as_str()).collect()
    }

    /// Space-joined path, e.g. `"remote add"`.
    pub fn display_path(&self) -> String {
        self.names().join(" ")
    }
}

impl Serialize for ResolvedCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolvedCommand", 2)?;
        state.serialize_field("path", &self.names())?;
        state.serialize_field("depth", &self.target.depth)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OptionSchema;

    fn sample_config() -> CliConfig {
        CliConfig::new("tool")
            .with_command(
                "remote",
                CommandDef::new()
                    .with_command("add", CommandDef::new().with_command("mirror", CommandDef::new()))
                    .with_command("remove", CommandDef::new()),
            )
            .with_command("build", CommandDef::new())
    }

    #[test]
    fn test_build_assigns_depths() {
        let graph = CommandGraph::build(&sample_config());
        let remote = graph.roots().get("remote").unwrap();
        assert_eq!(remote.depth, 0);
        let add = remote.children.get("add").unwrap();
        assert_eq!(add.depth, 1);
        assert_eq!(add.children.get("mirror").unwrap().depth, 2);
    }

    #[test]
    fn test_build_empty_config() {
        let graph = CommandGraph::build(&CliConfig::new("tool"));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_resolve_longest_path() {
        let graph = CommandGraph::build(&sample_config());
        let resolved = graph.resolve(&["remote", "add", "mirror"]).unwrap();
        assert_eq!(resolved.path.len(), 3);
        assert_eq!(resolved.target.name, "mirror");
        assert_eq!(resolved.display_path(), "remote add mirror");
    }

    #[test]
    fn test_resolve_reports_first_failing_segment() {
        let graph = CommandGraph::build(&sample_config());
        let err = graph.resolve(&["remote", "nope", "deeper"]).unwrap_err();
        assert_eq!(
            err,
            Error::CommandNotFound {
                path: vec!["remote".into(), "nope".into()]
            }
        );

        let err = graph.resolve(&["deploy"]).unwrap_err();
        assert_eq!(
            err,
            Error::CommandNotFound {
                path: vec!["deploy".into()]
            }
        );
    }

    #[test]
    fn test_resolve_empty_uses_marker() {
        let graph = CommandGraph::build(&sample_config());
        let empty: [&str; 0] = [];
        let err = graph.resolve(&empty).unwrap_err();
        assert_eq!(
            err,
            Error::CommandNotFound {
                path: vec![EMPTY_PATH_MARKER.into()]
            }
        );
    }

    #[test]
    fn test_node_options_are_normalized() {
        let config = CliConfig::new("tool").with_command(
            "build",
            CommandDef::new().with_option("fast", OptionSchema::flag().with_alias('f').with_alias('f')),
        );
        let graph = CommandGraph::build(&config);
        let build = graph.roots().get("build").unwrap();
        assert_eq!(build.options.get("fast").unwrap().alias, vec!['f']);
    }

    #[test]
    fn test_resolved_command_serializes_names() {
        let graph = CommandGraph::build(&sample_config());
        let resolved = graph.resolve(&["remote", "remove"]).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json, serde_json::json!({ "path": ["remote", "remove"], "depth": 1 }));
    }
}
