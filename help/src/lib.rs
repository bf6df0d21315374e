//! Plain-text help for clidef command trees.
//!
//! [`render_help`] produces the root screen and [`render_command_help`] the
//! screen for one command path. [`PlainHelp`] plugs both into
//! [`clidef_core::Cli`] so `--help` and `-h` work:
//!
//! ```
//! use clidef_core::{Cli, CliConfig, CommandDef, Outcome};
//! use clidef_help::PlainHelp;
//!
//! let config = CliConfig::new("tool").with_command("build", CommandDef::new());
//! let cli = Cli::new(config).unwrap().with_help_renderer(PlainHelp);
//!
//! let Outcome::Help(text) = cli.execute(&["build", "--help"]).unwrap() else {
//!     panic!("expected help");
//! };
//! assert!(text.contains("USAGE:\n  tool build [options]"));
//! ```

mod format;
mod options;
mod render;

pub use options::{render_global_options, render_options};
pub use render::{PlainHelp, render_command_help, render_help};
