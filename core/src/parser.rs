//! Argument-vector parsing.
//!
//! Two passes share one token grammar and one coercion core:
//!
//! - [`parse_argv`] (relaxed) scans the whole argument vector against the
//!   global schema only. Unknown options are skipped and every non-option
//!   token is collected as a positional. Global options are picked up
//!   wherever they appear, including after a command's positional arguments.
//! - [`parse_options`] (strict) scans the tokens after a resolved command
//!   path against the merged schema. Unknown options fail, and the first
//!   non-option token ends the scan.
//!
//! Token grammar:
//!
//! | token          | meaning                                             |
//! |----------------|-----------------------------------------------------|
//! | `--name`       | option without inline value                         |
//! | `--name=value` | option with inline value                            |
//! | `--no-name`    | negated flag (flags with `negate` enabled only)     |
//! | `-x`, `-xyz`   | short aliases, each resolved on its own             |
//! | `--`           | end of options                                      |
//! | `-`            | positional                                          |
//!
//! Both passes reject a second occurrence of the same option.

use serde::Serialize;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::schema::{FlagOption, OptionKind, OptionRecord, OptionSchema, normalize_option_record};
use crate::types::{Number, OptionValue, OptionValues};

/// Result of a relaxed parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgv {
    /// The argument vector as given.
    pub raw: Vec<String>,
    pub positionals: Vec<String>,
    pub options: OptionValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Relaxed,
    Strict,
}

/// Shape of a single raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    EndOfOptions,
    Long {
        name: &'a str,
        inline: Option<&'a str>,
    },
    ShortCluster(&'a str),
    Positional(&'a str),
}

impl<'a> Token<'a> {
    pub(crate) fn classify(raw: &'a str) -> Self {
        if raw == "--" {
            return Token::EndOfOptions;
        }
        if let Some(body) = raw.strip_prefix("--") {
            return match body.split_once('=') {
                Some((name, value)) => Token::Long {
                    name,
                    inline: Some(value),
                },
                None => Token::Long {
                    name: body,
                    inline: None,
                },
            };
        }
        match raw.strip_prefix('-') {
            Some(cluster) if !cluster.is_empty() => Token::ShortCluster(cluster),
            _ => Token::Positional(raw),
        }
    }
}

/// Whether `raw` would be read as an option token (`--x`, `-x` or `--`).
pub fn is_option_like(raw: &str) -> bool {
    !matches!(Token::classify(raw), Token::Positional(_))
}

/// Counts the leading option tokens of `tokens`, including a `--`
/// terminator. Values are not looked at.
pub(crate) fn count_option_tokens<S: AsRef<str>>(tokens: &[S]) -> usize {
    let mut count = 0;
    for raw in tokens {
        match Token::classify(raw.as_ref()) {
            Token::EndOfOptions => return count + 1,
            Token::Positional(_) => break,
            Token::Long { .. } | Token::ShortCluster(_) => count += 1,
        }
    }
    count
}

/// Relaxed parse of a whole argument vector against the global schema.
///
/// # Errors
///
/// Returns [`ParseError`] for a duplicate option or a malformed value of a
/// known option. Unknown options are never an error here, and a value-kind
/// option without value or default is skipped.
///
/// # Examples
///
/// ```
/// use clidef_core::{OptionRecord, OptionSchema, OptionValue, parse_argv};
///
/// let mut global = OptionRecord::new();
/// global.insert("verbose", OptionSchema::flag().with_alias('v'));
///
/// let parsed = parse_argv(&["build", "-v", "--threads=4", "file.txt"], &global).unwrap();
/// assert_eq!(parsed.positionals, vec!["build", "file.txt"]);
/// assert_eq!(parsed.options.get("verbose"), Some(&OptionValue::Bool(true)));
/// assert!(!parsed.options.contains_key("threads"));
/// ```
pub fn parse_argv<S: AsRef<str>>(argv: &[S], global: &OptionRecord) -> Result<ParsedArgv> {
    let scanner = Scanner::new(global, Mode::Relaxed);
    let mut options = OptionValues::new();
    let mut positionals = Vec::new();

    for (idx, raw) in argv.iter().enumerate() {
        let raw = raw.as_ref();
        match Token::classify(raw) {
            Token::EndOfOptions => {
                positionals.extend(argv[idx + 1..].iter().map(|s| s.as_ref().to_string()));
                break;
            }
            Token::Positional(value) => positionals.push(value.to_string()),
            token => scanner.apply(token, &mut options)?,
        }
    }

    debug!(
        options = options.len(),
        positionals = positionals.len(),
        "relaxed argv scan finished"
    );

    Ok(ParsedArgv {
        raw: argv.iter().map(|s| s.as_ref().to_string()).collect(),
        positionals,
        options,
    })
}

/// Strict parse of option tokens that follow a resolved command path.
///
/// Scanning stops at the first non-option token or at `--`; whatever follows
/// is left to the caller as positional arguments.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown options or aliases, duplicates, and
/// missing or malformed values.
///
/// # Examples
///
/// ```
/// use clidef_core::{Error, OptionRecord, OptionSchema, OptionValue, ParseError, parse_options};
///
/// let mut schema = OptionRecord::new();
/// schema.insert("threads", OptionSchema::number());
///
/// let values = parse_options(&["--threads=4", "input", "--threads=5"], &schema).unwrap();
/// assert_eq!(values.get("threads"), Some(&OptionValue::from(4)));
///
/// let err = parse_options(&["--fast"], &schema).unwrap_err();
/// assert_eq!(err, Error::Parse(ParseError::UnknownOption("--fast".into())));
/// ```
pub fn parse_options<S: AsRef<str>>(tokens: &[S], schema: &OptionRecord) -> Result<OptionValues> {
    let scanner = Scanner::new(schema, Mode::Strict);
    let mut options = OptionValues::new();

    for raw in tokens {
        match Token::classify(raw.as_ref()) {
            Token::EndOfOptions | Token::Positional(_) => break,
            token => scanner.apply(token, &mut options)?,
        }
    }

    debug!(options = options.len(), "strict option parse finished");
    Ok(options)
}

struct Scanner {
    schema: OptionRecord,
    mode: Mode,
}

impl Scanner {
    fn new(schema: &OptionRecord, mode: Mode) -> Self {
        Self {
            schema: normalize_option_record(schema),
            mode,
        }
    }

    fn apply(&self, token: Token<'_>, out: &mut OptionValues) -> std::result::Result<(), ParseError> {
        match token {
            Token::Long { name, inline } => self.apply_long(name, inline, out),
            Token::ShortCluster(cluster) => {
                for ch in cluster.chars() {
                    self.apply_short(ch, out)?;
                }
                Ok(())
            }
            Token::EndOfOptions | Token::Positional(_) => Ok(()),
        }
    }

    fn apply_long(
        &self,
        name: &str,
        inline: Option<&str>,
        out: &mut OptionValues,
    ) -> std::result::Result<(), ParseError> {
        let Some((key, schema, negated)) = self.lookup_long(name) else {
            return match self.mode {
                Mode::Relaxed => Ok(()),
                Mode::Strict => Err(ParseError::UnknownOption(format!("--{name}"))),
            };
        };
        let token = format!("--{name}");
        self.record(key, schema, inline, negated, token, out)
    }

    fn apply_short(&self, ch: char, out: &mut OptionValues) -> std::result::Result<(), ParseError> {
        let Some((key, schema)) = self
            .schema
            .iter()
            .find(|(_, schema)| schema.alias.contains(&ch))
        else {
            return match self.mode {
                Mode::Relaxed => Ok(()),
                Mode::Strict => Err(ParseError::UnknownShortAlias(ch)),
            };
        };
        self.record(key, schema, None, false, format!("-{ch}"), out)
    }

    fn record(
        &self,
        key: &str,
        schema: &OptionSchema,
        inline: Option<&str>,
        negated: bool,
        token: String,
        out: &mut OptionValues,
    ) -> std::result::Result<(), ParseError> {
        let value = match coerce(key, schema, inline, negated) {
            Ok(value) => value,
            Err(ParseError::MissingNumberValue(_) | ParseError::MissingEnumValue { .. })
                if self.mode == Mode::Relaxed =>
            {
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        if out.contains_key(key) {
            return Err(ParseError::DuplicateOption(token));
        }
        out.insert(key, value);
        Ok(())
    }

    /// Finds the schema for a long name. A declared name wins; otherwise
    /// `no-<flag>` negates a flag that allows it.
    fn lookup_long<'s>(&'s self, name: &str) -> Option<(&'s str, &'s OptionSchema, bool)> {
        if let Some((key, schema)) = self.schema.iter().find(|(key, _)| *key == name) {
            return Some((key, schema, false));
        }
        let base = name.strip_prefix("no-")?;
        let (key, schema) = self.schema.iter().find(|(key, _)| *key == base)?;
        match schema.kind {
            OptionKind::Flag(FlagOption { negate: true, .. }) => Some((key, schema, true)),
            _ => None,
        }
    }
}

/// Converts a raw inline value (or its absence) into a typed value.
fn coerce(
    name: &str,
    schema: &OptionSchema,
    inline: Option<&str>,
    negated: bool,
) -> std::result::Result<OptionValue, ParseError> {
    match &schema.kind {
        OptionKind::Flag(_) => Ok(OptionValue::Bool(match (negated, inline) {
            (true, _) => false,
            (false, None) => true,
            (false, Some(value)) => value != "false",
        })),
        OptionKind::String(opt) => Ok(OptionValue::String(match inline {
            Some(value) => value.to_string(),
            None => opt.default.clone().unwrap_or_default(),
        })),
        OptionKind::Number(opt) => match inline {
            None => opt
                .default
                .map(OptionValue::Number)
                .ok_or_else(|| ParseError::MissingNumberValue(name.to_string())),
            Some(value) => Number::parse(value)
                .map(OptionValue::Number)
                .ok_or_else(|| ParseError::NotANumber {
                    option: name.to_string(),
                    value: value.to_string(),
                }),
        },
        OptionKind::Enum(opt) => match inline {
            None => opt
                .default
                .clone()
                .map(OptionValue::String)
                .ok_or_else(|| ParseError::MissingEnumValue {
                    option: name.to_string(),
                    choices: opt.choices.join(","),
                }),
            Some(value) if opt.contains(value) => Ok(OptionValue::String(value.to_string())),
            Some(value) => Err(ParseError::NotInChoices {
                option: name.to_string(),
                value: value.to_string(),
            }),
        },
    }
}
