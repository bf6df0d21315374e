//! Post-parse value validation.
//!
//! [`validate_option_values`] checks parsed values against the constraints
//! declared in an [`OptionRecord`]. It walks the record in declaration order
//! and stops at the first violation. Defaults are not injected here; they
//! were applied while parsing.

use crate::error::{Result, ValidationError};
use crate::schema::{EnumOption, NumberOption, OptionKind, OptionRecord, StringOption};
use crate::types::{OptionValue, OptionValues};

/// Validates `values` against `schema`.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in declaration order.
///
/// # Examples
///
/// ```
/// use clidef_core::*;
///
/// let mut schema = OptionRecord::new();
/// schema.insert("threads", OptionSchema::new(NumberOption::new().with_min(1.0).with_max(8.0)).required());
///
/// let mut values = OptionValues::new();
/// values.insert("threads", OptionValue::from(4));
/// assert!(validate_option_values(&schema, &values).is_ok());
///
/// values.insert("threads", OptionValue::from(0));
/// let err = validate_option_values(&schema, &values).unwrap_err();
/// assert_eq!(err.code(), "E_VALIDATE");
/// ```
pub fn validate_option_values(schema: &OptionRecord, values: &OptionValues) -> Result<()> {
    for (name, def) in schema.iter() {
        let Some(value) = values.get(name) else {
            if def.required {
                return Err(ValidationError::RequiredMissing(name.to_string()).into());
            }
            continue;
        };

        match &def.kind {
            OptionKind::Flag(_) => validate_flag(name, value)?,
            OptionKind::String(opt) => validate_string(opt, name, value)?,
            OptionKind::Number(opt) => validate_number(opt, name, value)?,
            OptionKind::Enum(opt) => validate_enum(opt, name, value)?,
        }
    }
    Ok(())
}

fn wrong_type(name: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        option: name.to_string(),
        expected,
    }
}

fn validate_flag(name: &str, value: &OptionValue) -> std::result::Result<(), ValidationError> {
    match value {
        OptionValue::Bool(_) => Ok(()),
        _ => Err(wrong_type(name, "boolean")),
    }
}

fn validate_string(
    opt: &StringOption,
    name: &str,
    value: &OptionValue,
) -> std::result::Result<(), ValidationError> {
    let OptionValue::String(text) = value else {
        return Err(wrong_type(name, "a string"));
    };
    let length = text.chars().count();

    if let Some(min_length) = opt.min_length {
        if length < min_length {
            return Err(ValidationError::TooShort {
                option: name.to_string(),
                min_length,
            });
        }
    }
    if let Some(max_length) = opt.max_length {
        if length > max_length {
            return Err(ValidationError::TooLong {
                option: name.to_string(),
                max_length,
            });
        }
    }
    if let Some(pattern) = &opt.pattern {
        if !pattern.is_match(text) {
            return Err(ValidationError::PatternMismatch {
                option: name.to_string(),
                pattern: pattern.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_number(
    opt: &NumberOption,
    name: &str,
    value: &OptionValue,
) -> std::result::Result<(), ValidationError> {
    let number = match value {
        OptionValue::Number(n) if !n.is_nan() => *n,
        _ => return Err(wrong_type(name, "a number")),
    };

    if opt.integer && !number.is_integral() {
        return Err(ValidationError::NotInteger(name.to_string()));
    }
    if let Some(min) = opt.min {
        if number.as_f64() < min {
            return Err(ValidationError::BelowMin {
                option: name.to_string(),
                min,
            });
        }
    }
    if let Some(max) = opt.max {
        if number.as_f64() > max {
            return Err(ValidationError::AboveMax {
                option: name.to_string(),
                max,
            });
        }
    }
    Ok(())
}

fn validate_enum(
    opt: &EnumOption,
    name: &str,
    value: &OptionValue,
) -> std::result::Result<(), ValidationError> {
    let OptionValue::String(text) = value else {
        return Err(wrong_type(name, "a string"));
    };
    if !opt.contains(text) {
        return Err(ValidationError::NotInChoices {
            option: name.to_string(),
            value: text.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{OptionSchema, Pattern};
    use crate::types::Number;

    fn values(entries: &[(&str, OptionValue)]) -> OptionValues {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn only(name: &str, schema: OptionSchema) -> OptionRecord {
        let mut record = OptionRecord::new();
        record.insert(name, schema);
        record
    }

    fn validation_err(result: Result<()>) -> ValidationError {
        match result {
            Err(Error::Validation(err)) => err,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_optional_is_skipped() {
        let schema = only("threads", OptionSchema::new(NumberOption::new().with_min(1.0)));
        assert!(validate_option_values(&schema, &OptionValues::new()).is_ok());
    }

    #[test]
    fn test_required_missing() {
        let schema = only("mode", OptionSchema::enumeration(["dev"]).required());
        assert_eq!(
            validation_err(validate_option_values(&schema, &OptionValues::new())),
            ValidationError::RequiredMissing("mode".into())
        );
    }

    #[test]
    fn test_first_violation_in_declaration_order() {
        let mut schema = OptionRecord::new();
        schema.insert("b", OptionSchema::string().required());
        schema.insert("a", OptionSchema::flag().required());

        assert_eq!(
            validation_err(validate_option_values(&schema, &OptionValues::new())),
            ValidationError::RequiredMissing("b".into())
        );
    }

    #[test]
    fn test_wrong_runtime_type() {
        let schema = only("verbose", OptionSchema::flag());
        assert_eq!(
            validation_err(validate_option_values(
                &schema,
                &values(&[("verbose", OptionValue::from("yes"))])
            )),
            ValidationError::WrongType {
                option: "verbose".into(),
                expected: "boolean"
            }
        );

        let schema = only("threads", OptionSchema::number());
        assert!(matches!(
            validation_err(validate_option_values(
                &schema,
                &values(&[("threads", OptionValue::from(true))])
            )),
            ValidationError::WrongType { .. }
        ));
    }

    #[test]
    fn test_string_constraints() {
        let schema = only(
            "profile",
            OptionSchema::new(
                StringOption::new()
                    .with_min_length(2)
                    .with_max_length(4)
                    .with_pattern(Pattern::new("^[a-z]+$").unwrap()),
            ),
        );

        let check = |text: &str| {
            validate_option_values(&schema, &values(&[("profile", OptionValue::from(text))]))
        };

        assert!(check("abc").is_ok());
        assert!(matches!(validation_err(check("a")), ValidationError::TooShort { .. }));
        assert!(matches!(validation_err(check("abcde")), ValidationError::TooLong { .. }));
        assert_eq!(
            validation_err(check("Abc")),
            ValidationError::PatternMismatch {
                option: "profile".into(),
                pattern: "/^[a-z]+$/".into()
            }
        );
    }

    #[test]
    fn test_string_length_counts_characters() {
        let schema = only("name", OptionSchema::new(StringOption::new().with_max_length(2)));
        let result = validate_option_values(&schema, &values(&[("name", OptionValue::from("éé"))]));
        assert!(result.is_ok());
    }

    #[test]
    fn test_number_constraints() {
        let schema = only(
            "threads",
            OptionSchema::new(NumberOption::new().with_min(1.0).with_max(8.0).integer()),
        );
        let check = |n: OptionValue| validate_option_values(&schema, &values(&[("threads", n)]));

        assert!(check(OptionValue::from(8)).is_ok());
        assert!(check(OptionValue::from(2.0)).is_ok());
        assert_eq!(
            validation_err(check(OptionValue::from(2.5))),
            ValidationError::NotInteger("threads".into())
        );
        assert!(matches!(
            validation_err(check(OptionValue::from(0))),
            ValidationError::BelowMin { .. }
        ));
        assert!(matches!(
            validation_err(check(OptionValue::from(9))),
            ValidationError::AboveMax { .. }
        ));
        assert!(matches!(
            validation_err(check(OptionValue::Number(Number::Float(f64::NAN)))),
            ValidationError::WrongType { .. }
        ));
    }

    #[test]
    fn test_enum_membership_after_injection() {
        let schema = only("mode", OptionSchema::enumeration(["dev", "prod"]));
        assert!(
            validate_option_values(&schema, &values(&[("mode", OptionValue::from("PROD"))])).is_ok()
        );
        assert_eq!(
            validation_err(validate_option_values(
                &schema,
                &values(&[("mode", OptionValue::from("staging"))])
            )),
            ValidationError::NotInChoices {
                option: "mode".into(),
                value: "staging".into()
            }
        );
    }

    #[test]
    fn test_values_not_in_schema_are_ignored() {
        let schema = only("verbose", OptionSchema::flag());
        let result = validate_option_values(&schema, &values(&[("other", OptionValue::from(1))]));
        assert!(result.is_ok());
    }
}
