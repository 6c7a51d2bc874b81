//! # Validation Module
//!
//! Numeric coercion of raw form values, and the checks calculator
//! definitions must pass before they are used.
//!
//! ## Coercion Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Raw Value → Number                                 │
//! │                                                                         │
//! │  "  £1,250.50 "  ──► trim, drop "£" and "," ──► 1250.5   ✅             │
//! │  ""              ──► fallback                                            │
//! │  "abc"           ──► fallback                                            │
//! │  "NaN" / "inf"   ──► fallback                                            │
//! │  -3 (min 0)      ──► fallback                                            │
//! │                                                                         │
//! │  INPUTS never raise: a bad value silently becomes the declared default. │
//! │  OVERRIDES are stricter: only finite values > 0 win; anything else is   │
//! │  reported as InvalidOverride and the computed value is used instead.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use equicost_core::types::RawValue;
//! use equicost_core::validation::{coerce_number, parse_override};
//!
//! assert_eq!(coerce_number(Some(&RawValue::from("£9.50")), 0.0, 9.0), 9.5);
//! assert_eq!(coerce_number(Some(&RawValue::from("")), 0.0, 9.0), 9.0);
//! assert!(parse_override("bag_price", &RawValue::from("-1")).is_err());
//! ```

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::types::RawValue;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Parses a raw form value into a finite number.
///
/// ## Rules
/// - Strings are trimmed; a leading `£` and thousands separators are dropped
/// - `Missing` and blank text are `Required`
/// - Non-numeric text is `InvalidNumber`
/// - NaN and infinities are `NotFinite`
pub fn parse_number(field: &str, raw: &RawValue) -> ValidationResult<f64> {
    let value = match raw {
        RawValue::Missing => {
            return Err(ValidationError::Required {
                field: field.to_string(),
            })
        }
        RawValue::Number(n) => *n,
        RawValue::Text(text) => {
            let cleaned: String = text
                .trim()
                .trim_start_matches('£')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            let cleaned = cleaned.trim();

            if cleaned.is_empty() {
                return Err(ValidationError::Required {
                    field: field.to_string(),
                });
            }

            cleaned
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidNumber {
                    field: field.to_string(),
                    raw: text.clone(),
                })?
        }
    };

    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    Ok(value)
}

/// Coerces an optional raw value, never failing.
///
/// Missing, unparseable, non-finite or below-`min` values all become
/// `fallback`.
pub fn coerce_number(raw: Option<&RawValue>, min: f64, fallback: f64) -> f64 {
    raw.and_then(|raw| parse_number("value", raw).ok())
        .filter(|value| *value >= min)
        .unwrap_or(fallback)
}

/// Accepts an override only when it is a finite number greater than zero.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  "Bag price" field                                                      │
/// │                                                                         │
/// │  user types "11.50" ──► Ok(11.5)  ──► replaces catalog price            │
/// │  user clears field  ──► Err       ──► catalog price used                │
/// │  user types "-2"    ──► Err       ──► catalog price used                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn parse_override(name: &str, raw: &RawValue) -> ValidationResult<f64> {
    let invalid = || ValidationError::InvalidOverride {
        name: name.to_string(),
        raw: raw.to_string(),
    };

    let value = parse_number(name, raw).map_err(|_| invalid())?;
    if value <= 0.0 {
        return Err(invalid());
    }

    Ok(value)
}

// =============================================================================
// Definition Validators
// =============================================================================

/// Validates a catalog, factor, input or rule key.
///
/// ## Rules
/// - Must not be empty
/// - Lowercase ASCII letters, digits and underscores only
pub fn validate_key(field: &str, key: &str) -> ValidationResult<()> {
    if key.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' must contain only a-z, 0-9 and underscores", key),
        });
    }

    Ok(())
}

/// Validates that every key in a table is unique.
pub fn validate_unique_keys<'a>(
    field: &str,
    keys: impl IntoIterator<Item = &'a str>,
) -> ValidationResult<()> {
    let mut seen = BTreeSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a catalog base rate: finite and zero or more.
///
/// Zero is allowed (a rubber-matted stable has almost no recurring cost).
pub fn validate_base_rate(field: &str, rate: f64) -> ValidationResult<()> {
    validate_non_negative(field, rate)
}

/// Validates an adjustment multiplier: finite and strictly positive.
pub fn validate_multiplier(field: &str, multiplier: f64) -> ValidationResult<()> {
    if !multiplier.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if multiplier <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a constant, field value or input bound: finite and >= 0.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("x", &RawValue::Number(2.0)).unwrap(), 2.0);
        assert_eq!(parse_number("x", &RawValue::from(" 4.5 ")).unwrap(), 4.5);
        assert_eq!(parse_number("x", &RawValue::from("£1,250.50")).unwrap(), 1250.5);

        assert!(matches!(
            parse_number("x", &RawValue::from("")),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_number("x", &RawValue::Missing),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_number("x", &RawValue::from("six")),
            Err(ValidationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_number("x", &RawValue::from("NaN")),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(matches!(
            parse_number("x", &RawValue::Number(f64::INFINITY)),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_coerce_number_falls_back() {
        assert_eq!(coerce_number(None, 0.0, 6.0), 6.0);
        assert_eq!(coerce_number(Some(&RawValue::from("")), 0.0, 6.0), 6.0);
        assert_eq!(coerce_number(Some(&RawValue::from("abc")), 0.0, 6.0), 6.0);
        assert_eq!(coerce_number(Some(&RawValue::Missing), 0.0, 6.0), 6.0);
        assert_eq!(coerce_number(Some(&RawValue::Number(-1.0)), 0.0, 6.0), 6.0);
        assert_eq!(coerce_number(Some(&RawValue::from("8")), 0.0, 6.0), 8.0);
        // Zero is a legitimate value (field cleared to 0 horses)
        assert_eq!(coerce_number(Some(&RawValue::Number(0.0)), 0.0, 6.0), 0.0);
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("bag_price", &RawValue::from("11.5")).unwrap(), 11.5);
        assert!(parse_override("bag_price", &RawValue::from("")).is_err());
        assert!(parse_override("bag_price", &RawValue::from("-3")).is_err());
        assert!(parse_override("bag_price", &RawValue::Number(0.0)).is_err());
        assert!(parse_override("bag_price", &RawValue::from("cheap")).is_err());
        assert!(parse_override("bag_price", &RawValue::Missing).is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("key", "wood_pellets").is_ok());
        assert!(validate_key("key", "region2").is_ok());
        assert!(validate_key("key", "").is_err());
        assert!(validate_key("key", "Wood Pellets").is_err());
        assert!(validate_key("key", "wood-pellets").is_err());
    }

    #[test]
    fn test_validate_unique_keys() {
        assert!(validate_unique_keys("key", ["a", "b", "c"]).is_ok());
        assert!(matches!(
            validate_unique_keys("key", ["a", "b", "a"]),
            Err(ValidationError::Duplicate { value, .. }) if value == "a"
        ));
    }

    #[test]
    fn test_validate_rates_and_multipliers() {
        assert!(validate_base_rate("base_rate", 0.0).is_ok());
        assert!(validate_base_rate("base_rate", 9.0).is_ok());
        assert!(validate_base_rate("base_rate", -0.01).is_err());
        assert!(validate_base_rate("base_rate", f64::NAN).is_err());

        assert!(validate_multiplier("multiplier", 0.85).is_ok());
        assert!(validate_multiplier("multiplier", 0.0).is_err());
        assert!(validate_multiplier("multiplier", -1.0).is_err());
        assert!(validate_multiplier("multiplier", f64::INFINITY).is_err());
    }
}
