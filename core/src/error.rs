//! Error taxonomy for command resolution, parsing and validation.
//!
//! Every failure the engine can produce is an [`Error`]. Callers that need to
//! branch on the category use [`Error::code`], which returns a stable
//! machine-readable string.

use thiserror::Error;

/// Path reported by [`Error::CommandNotFound`] when no command token exists.
pub const EMPTY_PATH_MARKER: &str = "<empty>";

/// Malformed token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Long option (or `--no-` form) not declared in the active schema.
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    /// Short alias character not bound to any option.
    #[error("Unknown short alias: -{0}")]
    UnknownShortAlias(char),
    /// The same option was given twice in one parse pass. Holds the token
    /// form of the second occurrence (`--name` or `-x`).
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
    /// Number option without inline value and without default.
    #[error("Option --{0} requires a number value")]
    MissingNumberValue(String),
    #[error("Value for --{option} is not a number: {value}")]
    NotANumber { option: String, value: String },
    /// Enum option without inline value and without default.
    #[error("Enum option --{option} requires a value: {choices}")]
    MissingEnumValue { option: String, choices: String },
    #[error("Value for --{option} not in enum choices: {value}")]
    NotInChoices { option: String, value: String },
}

/// Value present but violating a declared constraint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required option missing: --{0}")]
    RequiredMissing(String),
    #[error("Option --{option} must be {expected}")]
    WrongType {
        option: String,
        expected: &'static str,
    },
    #[error("String --{option} length < minLength {min_length}")]
    TooShort { option: String, min_length: usize },
    #[error("String --{option} length > maxLength {max_length}")]
    TooLong { option: String, max_length: usize },
    #[error("String --{option} does not match pattern {pattern}")]
    PatternMismatch { option: String, pattern: String },
    #[error("Option --{0} must be an integer")]
    NotInteger(String),
    #[error("Value for --{option} < min {min}")]
    BelowMin { option: String, min: f64 },
    #[error("Value for --{option} > max {max}")]
    AboveMax { option: String, max: f64 },
    #[error("Value for --{option} is not in enum choices: {value}")]
    NotInChoices { option: String, value: String },
}

/// Base error for the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Argument path did not resolve. `path` is the matched prefix followed by
    /// the first failing token, or [`EMPTY_PATH_MARKER`] alone.
    #[error("Command not found: {}", .path.join(" "))]
    CommandNotFound { path: Vec<String> },

    /// Construction-time conflict between option declarations.
    #[error("Option conflict '{option}': {detail}")]
    OptionConflict { option: String, detail: String },
}

impl Error {
    /// Stable code for switching on the error category.
    ///
    /// # Examples
    ///
    /// ```
    /// use clidef_core::{Error, ParseError};
    ///
    /// let err = Error::from(ParseError::UnknownOption("--nope".into()));
    /// assert_eq!(err.code(), "E_PARSE");
    /// assert_eq!(err.to_string(), "Unknown option: --nope");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Error::Parse(_) => "E_PARSE",
            Error::Validation(_) => "E_VALIDATE",
            Error::CommandNotFound { .. } => "E_COMMAND_NOT_FOUND",
            Error::OptionConflict { .. } => "E_OPTION_CONFLICT",
        }
    }

    pub(crate) fn command_not_found(path: Vec<String>) -> Self {
        Error::CommandNotFound { path }
    }

    pub(crate) fn conflict(option: &str, detail: impl Into<String>) -> Self {
        Error::OptionConflict {
            option: option.to_string(),
            detail: detail.into(),
        }
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
