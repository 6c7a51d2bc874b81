//! # Error Types
//!
//! Domain-specific error types for equicost-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  equicost-core errors (this file)                                       │
//! │  ├── CoreError        - Lookup failures, zero divisors                  │
//! │  ├── ValidationError  - Numeric coercion / definition checks            │
//! │  └── ConfigError      - Calculator definitions that fail to load        │
//! │                                                                         │
//! │  widget-host errors (separate crate)                                    │
//! │  └── ApiError         - What the presentation surface sees              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Widget                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recoverable vs. Surfaced
//! Most of these never reach a user. A stale catalog key falls back to the
//! catalog default, a malformed override falls back to the computed value and
//! a zero divisor omits the metric. Only definition defects (a default key
//! that does not exist, a rule naming an unknown input) escape `calculate`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core estimation errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No calculator with this name is registered.
    #[error("Calculator not found: {0}")]
    CalculatorNotFound(String),

    /// A named rate catalog does not exist in the calculator definition.
    #[error("Catalog not found: {0}")]
    CatalogNotFound(String),

    /// A key is absent from the named catalog.
    ///
    /// ## When This Occurs
    /// - A widget still holds a preset removed by a catalog update
    /// - A comparison names an alternative the catalog does not carry
    #[error("Catalog entry not found: {catalog}/{key}")]
    EntryNotFound { catalog: String, key: String },

    /// A named adjustment factor class does not exist.
    #[error("Factor class not found: {0}")]
    FactorClassNotFound(String),

    /// A key is absent from the named factor class.
    #[error("Adjustment factor not found: {class}/{key}")]
    FactorNotFound { class: String, key: String },

    /// A rule references a numeric input the calculator does not declare.
    #[error("Unknown input: {0}")]
    UnknownInput(String),

    /// A rule references a toggle the calculator does not declare.
    #[error("Unknown toggle: {0}")]
    UnknownToggle(String),

    /// A derived metric was asked to divide by zero.
    ///
    /// The summarizer turns this into "not applicable" rather than failing
    /// the calculation; a cleared form field is a normal transient state.
    #[error("Division by zero while computing {metric}")]
    DivisionByZero { metric: String },

    /// Calculator definition error (wraps ConfigError).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for the lookup failures callers are expected to guard against.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::CalculatorNotFound(_)
                | CoreError::CatalogNotFound(_)
                | CoreError::EntryNotFound { .. }
                | CoreError::FactorClassNotFound(_)
                | CoreError::FactorNotFound { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input and definition validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Raw text did not coerce to a number.
    #[error("{field} is not a number: '{raw}'")]
    InvalidNumber { field: String, raw: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// NaN or infinity.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// A free-form override was present but unusable.
    #[error("Override {name} ignored: '{raw}' is not a positive number")]
    InvalidOverride { name: String, raw: String },

    /// Key contains characters outside `[a-z0-9_]`.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate catalog key).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading calculator definitions.
///
/// A definition either loads completely or not at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML text could not be deserialized.
    #[error("Failed to parse calculator definition {origin}: {message}")]
    Parse { origin: String, message: String },

    /// The definition parsed but breaks an invariant.
    #[error("Invalid calculator definition {calculator}: {reason}")]
    Invalid { calculator: String, reason: String },

    /// Two definitions in the same registry share a name.
    #[error("Calculator {0} is defined more than once")]
    DuplicateCalculator(String),
}

impl ConfigError {
    pub(crate) fn invalid(calculator: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            calculator: calculator.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::EntryNotFound {
            catalog: "bedding".to_string(),
            key: "sawdust".to_string(),
        };
        assert_eq!(err.to_string(), "Catalog entry not found: bedding/sawdust");

        let err = CoreError::DivisionByZero {
            metric: "per_acre".to_string(),
        };
        assert_eq!(err.to_string(), "Division by zero while computing per_acre");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidOverride {
            name: "bag_price".to_string(),
            raw: "-3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Override bag_price ignored: '-3' is not a positive number"
        );
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "key".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = ConfigError::DuplicateCalculator("bedding".into()).into();
        assert!(matches!(core_err, CoreError::Config(_)));
    }

    #[test]
    fn test_is_not_found() {
        assert!(CoreError::FactorNotFound {
            class: "region".into(),
            key: "mars".into()
        }
        .is_not_found());
        assert!(!CoreError::UnknownInput("horses".into()).is_not_found());
    }
}
