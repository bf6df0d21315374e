//! Hint shown when no configuration file exists.

use crate::load::CONFIG_FILE_NAMES;

/// Explains where a configuration file is expected and shows a minimal one.
///
/// # Examples
///
/// ```
/// let hint = clidef_loader::sample_config_hint();
/// assert!(hint.starts_with("No configuration file found."));
/// assert!(hint.contains("clidef.config.yaml"));
/// ```
pub fn sample_config_hint() -> String {
    let mut hint = String::from(
        "No configuration file found.\nCreate one of the following in the project root:\n",
    );
    for name in CONFIG_FILE_NAMES {
        hint.push_str(&format!("  - {name}\n"));
    }
    hint.push_str(
        "Minimal example (YAML):

name: mycli
version: 0.0.1
options:
  verbose:
    kind: flag
    alias: v
    description: Verbose output
commands:
  hello:
    description: Greet user
",
    );
    hint
}
