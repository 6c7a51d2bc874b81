//! # API Error Type
//!
//! Unified error type for host commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Widget Host                        │
//! │                                                                         │
//! │  Widget                      Rust Host                                  │
//! │  ──────                      ─────────                                  │
//! │                                                                         │
//! │  calculate('bedding', input)                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Unknown calculator? ── CoreError::CalculatorNotFound ──┐       │  │
//! │  │         │                                               │       │  │
//! │  │         ▼                                               ▼       │  │
//! │  │  Broken definition? ─── ConfigError::Invalid ──────── ApiError ►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Calculator not found: hay" }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stale keys, bad overrides and zero divisors never reach this type: the
//! core recovers from them and still returns a result.

use equicost_core::{ConfigError, CoreError};
use serde::Serialize;

use crate::state::HostConfigError;

/// Error returned from host commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Calculator not found: hay"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Calculator, catalog, entry or factor not found
    NotFound,

    /// Request rejected (unknown input name, bad CLI argument)
    ValidationError,

    /// Calculator definition or host config could not be loaded
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConfigError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The error as a single JSON line, for stderr.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_not_found() {
            return ApiError::new(ErrorCode::NotFound, err.to_string());
        }
        match err {
            CoreError::Config(e) => ApiError::from(e),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::UnknownInput(_) | CoreError::UnknownToggle(_) => {
                ApiError::validation(err.to_string())
            }
            other => {
                tracing::error!("Calculation failed: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::config(err.to_string())
    }
}

impl From<HostConfigError> for ApiError {
    fn from(err: HostConfigError) -> Self {
        ApiError::config(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: ApiError = CoreError::CalculatorNotFound("hay".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("hay"));
    }

    #[test]
    fn test_config_error_maps_to_config_code() {
        let err: ApiError = CoreError::Config(ConfigError::DuplicateCalculator("bedding".into())).into();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }

    #[test]
    fn test_unknown_input_is_validation() {
        let err: ApiError = CoreError::UnknownInput("hooves".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Calculator", "hay");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Calculator not found: hay");
        assert_eq!(err.to_string(), "[NotFound] Calculator not found: hay");
    }
}
