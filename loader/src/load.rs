//! Configuration discovery and parsing.
//!
//! A configuration document is either a bare [`CliConfig`] or one wrapped
//! under a top-level `config` (or `default`) key:
//!
//! ```yaml
//! config:
//!   name: tool
//!   commands:
//!     build: {}
//! ```

use std::path::{Path, PathBuf};

use clidef_core::CliConfig;
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::error::{LoaderError, Result};

/// File names probed by [`find_config`], in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = [
    "clidef.config.json",
    "clidef.config.yaml",
    "clidef.config.yml",
];

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use clidef_loader::ConfigFormat;
    ///
    /// assert_eq!(ConfigFormat::from_path("a/clidef.config.yml"), Some(ConfigFormat::Yaml));
    /// assert_eq!(ConfigFormat::from_path("cli.JSON"), Some(ConfigFormat::Json));
    /// assert_eq!(ConfigFormat::from_path("cli.toml"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }
}

/// Top-level keys that mark a wrapped document.
#[derive(Deserialize)]
struct Probe {
    #[serde(default)]
    config: Option<IgnoredAny>,
    #[serde(default)]
    default: Option<IgnoredAny>,
}

#[derive(Deserialize)]
struct ConfigWrapper {
    config: CliConfig,
}

#[derive(Deserialize)]
struct DefaultWrapper {
    default: CliConfig,
}

fn from_text<T: for<'de> Deserialize<'de>>(text: &str, format: ConfigFormat) -> Result<T> {
    Ok(match format {
        ConfigFormat::Json => serde_json::from_str(text)?,
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

/// Parses a configuration document.
///
/// A top-level `config` key wins over `default`; without either the whole
/// document is the configuration.
///
/// # Errors
///
/// Returns [`LoaderError::JsonError`] or [`LoaderError::YamlError`] when the
/// text is malformed or does not describe a configuration.
///
/// # Examples
///
/// ```
/// use clidef_loader::{ConfigFormat, parse_config};
///
/// let bare = parse_config(r#"{"name": "tool", "commands": {}}"#, ConfigFormat::Json).unwrap();
/// let wrapped = parse_config("config:\n  name: tool\n  commands: {}\n", ConfigFormat::Yaml).unwrap();
/// assert_eq!(bare.name, wrapped.name);
/// ```
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<CliConfig> {
    let probe: Probe = from_text(text, format)?;
    if probe.config.is_some() {
        debug!("configuration wrapped under `config`");
        return Ok(from_text::<ConfigWrapper>(text, format)?.config);
    }
    if probe.default.is_some() {
        debug!("configuration wrapped under `default`");
        return Ok(from_text::<DefaultWrapper>(text, format)?.default);
    }
    from_text(text, format)
}

/// Loads one configuration file, choosing the format by extension.
///
/// # Errors
///
/// Returns [`LoaderError::UnsupportedFormat`] for an unknown extension,
/// [`LoaderError::IoError`] if the file cannot be read, and a parse error
/// otherwise.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<CliConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| LoaderError::UnsupportedFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path)?;
    let config = parse_config(&text, format)?;
    debug!(
        path = %path.display(),
        name = %config.name,
        commands = config.command_count(),
        "configuration loaded"
    );
    Ok(config)
}

/// Returns the first of [`CONFIG_FILE_NAMES`] that exists in `dir`.
pub fn find_config(dir: impl AsRef<Path>) -> Option<PathBuf> {
    let dir = dir.as_ref();
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Loads the configuration found in `dir`, or `None` when there is none.
///
/// # Errors
///
/// Any error from [`load_config_file`] for the file that was found.
///
/// # Examples
///
/// ```
/// use clidef_loader::load_config;
///
/// let dir = std::env::temp_dir().join("clidef_loader_doc_empty");
/// std::fs::create_dir_all(&dir).unwrap();
/// assert!(load_config(&dir).unwrap().is_none());
/// ```
pub fn load_config(dir: impl AsRef<Path>) -> Result<Option<CliConfig>> {
    match find_config(&dir) {
        Some(path) => load_config_file(path).map(Some),
        None => {
            debug!(dir = %dir.as_ref().display(), "no configuration file found");
            Ok(None)
        }
    }
}
