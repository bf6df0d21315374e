//! Discovery and loading of clidef configuration files.
//!
//! A project declares its CLI in one of [`CONFIG_FILE_NAMES`] at its root.
//! [`load_config`] probes a directory for them in order; [`load_config_file`]
//! reads one explicit file, picking JSON or YAML by extension.
//!
//! # Quick start
//!
//! ```no_run
//! use clidef_loader::{load_config, sample_config_hint};
//!
//! match load_config(".").unwrap() {
//!     Some(config) => println!("{} has {} commands", config.name, config.command_count()),
//!     None => eprintln!("{}", sample_config_hint()),
//! }
//! ```

mod error;
mod load;
mod sample;

pub use error::{LoaderError, Result};
pub use load::{
    CONFIG_FILE_NAMES, ConfigFormat, find_config, load_config, load_config_file, parse_config,
};
pub use sample::sample_config_hint;
