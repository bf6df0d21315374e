//! Option schema definitions and normalization.
//!
//! An [`OptionSchema`] describes one named option: shared metadata
//! (description, `required`, short aliases) plus an [`OptionKind`] carrying
//! only the fields relevant to that kind. Every constructor fills every field,
//! so a schema is total before any parsing begins.
//!
//! Schemas deserialize from the configuration shape used by the loader:
//!
//! ```
//! use clidef_core::{OptionKind, OptionSchema};
//!
//! let schema: OptionSchema = serde_json::from_str(
//!     r#"{ "kind": "number", "alias": "t", "min": 1, "max": 8, "required": true }"#,
//! ).unwrap();
//!
//! assert!(schema.required);
//! assert_eq!(schema.alias, vec!['t']);
//! assert!(matches!(schema.kind, OptionKind::Number(_)));
//! ```

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ordered::OrderedMap;
use crate::types::{Number, OptionValue};

/// Mapping of option name to schema, in declaration order.
pub type OptionRecord = OrderedMap<OptionSchema>;

/// Schema for a single option.
///
/// # Examples
///
/// ```
/// use clidef_core::{EnumOption, OptionSchema};
///
/// let verbose = OptionSchema::flag()
///     .with_alias('v')
///     .with_description("Verbose output");
/// assert_eq!(verbose.kind_name(), "flag");
///
/// let mode = OptionSchema::new(EnumOption::new(["dev", "prod"]).with_default("dev")).required();
/// assert!(mode.required);
/// assert_eq!(mode.kind_name(), "enum");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether validation fails when the option is absent.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Single-character short forms (`-v`).
    #[serde(
        default,
        deserialize_with = "deserialize_alias",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alias: Vec<char>,
    /// Kind-specific data.
    #[serde(flatten)]
    pub kind: OptionKind,
}

/// Closed set of option kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OptionKind {
    Flag(FlagOption),
    String(StringOption),
    Number(NumberOption),
    Enum(EnumOption),
}

/// Boolean flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagOption {
    #[serde(default)]
    pub default: bool,
    /// Enables the `--no-<name>` form.
    #[serde(default = "default_true")]
    pub negate: bool,
}

impl Default for FlagOption {
    fn default() -> Self {
        Self {
            default: false,
            negate: true,
        }
    }
}

impl FlagOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: bool) -> Self {
        self.default = value;
        self
    }

    /// Disables the `--no-<name>` form.
    pub fn without_negation(mut self) -> Self {
        self.negate = false;
        self
    }
}

/// Free-form string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
}

impl StringOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Numeric value, integer or float.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Rejects values with a fractional part during validation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub integer: bool,
}

impl NumberOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: impl Into<Number>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
}

/// String drawn from a closed set of choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
}

impl EnumOption {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default: None,
            choices: choices.into_iter().map(Into::into).collect(),
            case_sensitive: false,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Checks membership, folding case unless `case_sensitive` is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use clidef_core::EnumOption;
    ///
    /// let mode = EnumOption::new(["DEV", "PROD"]);
    /// assert!(mode.contains("dev"));
    /// assert!(!mode.clone().case_sensitive().contains("dev"));
    /// assert!(!mode.contains("staging"));
    /// ```
    pub fn contains(&self, value: &str) -> bool {
        if self.case_sensitive {
            self.choices.iter().any(|c| c == value)
        } else {
            let needle = value.to_lowercase();
            self.choices.iter().any(|c| c.to_lowercase() == needle)
        }
    }
}

impl From<FlagOption> for OptionKind {
    fn from(opt: FlagOption) -> Self {
        OptionKind::Flag(opt)
    }
}

impl From<StringOption> for OptionKind {
    fn from(opt: StringOption) -> Self {
        OptionKind::String(opt)
    }
}

impl From<NumberOption> for OptionKind {
    fn from(opt: NumberOption) -> Self {
        OptionKind::Number(opt)
    }
}

impl From<EnumOption> for OptionKind {
    fn from(opt: EnumOption) -> Self {
        OptionKind::Enum(opt)
    }
}

impl OptionKind {
    /// Lowercase kind name as written in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            OptionKind::Flag(_) => "flag",
            OptionKind::String(_) => "string",
            OptionKind::Number(_) => "number",
            OptionKind::Enum(_) => "enum",
        }
    }

    /// Whether the option needs a value (everything except flags).
    pub fn takes_value(&self) -> bool {
        !matches!(self, OptionKind::Flag(_))
    }
}

impl OptionSchema {
    /// Creates a schema of the given kind with no description, not required
    /// and no aliases.
    pub fn new(kind: impl Into<OptionKind>) -> Self {
        Self {
            description: None,
            required: false,
            alias: Vec::new(),
            kind: kind.into(),
        }
    }

    /// Flag with `default = false` and negation enabled.
    pub fn flag() -> Self {
        Self::new(FlagOption::new())
    }

    pub fn string() -> Self {
        Self::new(StringOption::new())
    }

    pub fn number() -> Self {
        Self::new(NumberOption::new())
    }

    pub fn enumeration<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(EnumOption::new(choices))
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_alias(mut self, alias: char) -> Self {
        self.alias.push(alias);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// The declared default as a value, if the kind has one.
    ///
    /// Flags always have a default; other kinds only when declared.
    pub fn default_value(&self) -> Option<OptionValue> {
        match &self.kind {
            OptionKind::Flag(flag) => Some(OptionValue::Bool(flag.default)),
            OptionKind::String(opt) => opt.default.clone().map(OptionValue::String),
            OptionKind::Number(opt) => opt.default.map(OptionValue::Number),
            OptionKind::Enum(opt) => opt.default.clone().map(OptionValue::String),
        }
    }
}

/// Compiled regular expression used by string options.
///
/// Serializes as its source text; equality compares the source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] when `source` is not a valid expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AliasSpec {
    One(char),
    Many(Vec<char>),
}

fn deserialize_alias<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<char>, D::Error> {
    Ok(match Option::<AliasSpec>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(AliasSpec::One(c)) => vec![c],
        Some(AliasSpec::Many(list)) => list,
    })
}

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Returns an equivalent record whose alias lists hold distinct characters.
///
/// First occurrences keep their position. Normalizing an already normalized
/// record returns an equal record.
///
/// # Examples
///
/// ```
/// use clidef_core::{OptionRecord, OptionSchema, normalize_option_record};
///
/// let mut record = OptionRecord::new();
/// record.insert("verbose", OptionSchema::flag().with_alias('v').with_alias('V').with_alias('v'));
///
/// let once = normalize_option_record(&record);
/// assert_eq!(once.get("verbose").unwrap().alias, vec!['v', 'V']);
/// assert_eq!(normalize_option_record(&once), once);
/// ```
pub fn normalize_option_record(record: &OptionRecord) -> OptionRecord {
    record
        .iter()
        .map(|(name, schema)| {
            let mut alias: Vec<char> = Vec::with_capacity(schema.alias.len());
            for c in &schema.alias {
                if !alias.contains(c) {
                    alias.push(*c);
                }
            }
            let mut schema = schema.clone();
            schema.alias = alias;
            (name.to_string(), schema)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults_are_total() {
        let schema = OptionSchema::flag();
        assert_eq!(
            schema.kind,
            OptionKind::Flag(FlagOption {
                default: false,
                negate: true
            })
        );
        assert_eq!(schema.default_value(), Some(OptionValue::Bool(false)));
    }

    #[test]
    fn test_deserialize_alias_forms() {
        let single: OptionSchema = serde_json::from_str(r#"{"kind":"flag","alias":"v"}"#).unwrap();
        assert_eq!(single.alias, vec!['v']);

        let list: OptionSchema =
            serde_json::from_str(r#"{"kind":"flag","alias":["v","x"]}"#).unwrap();
        assert_eq!(list.alias, vec!['v', 'x']);

        let absent: OptionSchema = serde_json::from_str(r#"{"kind":"flag"}"#).unwrap();
        assert!(absent.alias.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_multi_char_alias() {
        let result: Result<OptionSchema, _> =
            serde_json::from_str(r#"{"kind":"flag","alias":"verbose"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_kind_specific_fields() {
        let schema: OptionSchema = serde_json::from_str(
            r#"{"kind":"string","min_length":2,"max_length":5,"pattern":"^[a-z]+$"}"#,
        )
        .unwrap();
        let OptionKind::String(opt) = &schema.kind else {
            panic!("expected string kind");
        };
        assert_eq!(opt.min_length, Some(2));
        assert_eq!(opt.max_length, Some(5));
        assert!(opt.pattern.as_ref().unwrap().is_match("abc"));

        let flag: OptionSchema =
            serde_json::from_str(r#"{"kind":"flag","negate":false}"#).unwrap();
        assert_eq!(
            flag.kind,
            OptionKind::Flag(FlagOption {
                default: false,
                negate: false
            })
        );
    }

    #[test]
    fn test_integer_default_stays_integer() {
        let schema: OptionSchema =
            serde_json::from_str(r#"{"kind":"number","default":4}"#).unwrap();
        let OptionKind::Number(opt) = &schema.kind else {
            panic!("expected number kind");
        };
        assert_eq!(opt.default, Some(Number::Integer(4)));
    }

    #[test]
    fn test_invalid_pattern_fails_to_deserialize() {
        let result: Result<OptionSchema, _> =
            serde_json::from_str(r#"{"kind":"string","pattern":"("}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_passes_other_fields_through() {
        let mut record = OptionRecord::new();
        record.insert(
            "threads",
            OptionSchema::new(NumberOption::new().with_min(1.0).with_default(2))
                .required()
                .with_description("Worker threads"),
        );

        let normalized = normalize_option_record(&record);
        assert_eq!(normalized, record);
    }
}
