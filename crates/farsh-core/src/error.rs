//! # Error Types
//!
//! Domain-specific error types for farsh-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  farsh-core errors (this file)                                         │
//! │  ├── CoreError        - Draft/domain rule violations                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  farsh-client errors (separate crate)                                  │
//! │  └── ClientError      - HTTP, session, config failures                 │
//! │                                                                         │
//! │  farsh-export errors (separate crate)                                  │
//! │  └── ExportError      - PDF / spreadsheet rendering failures           │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CliError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The draft was finalized; it is read-only for the rest of the session.
    ///
    /// ## When This Occurs
    /// - Editing any field after Finalize succeeded
    /// - Calling Save Draft or Finalize a second time
    #[error("Invoice has already been finalized and can no longer be changed")]
    DraftFinalized,

    /// No line item with the given local row id.
    #[error("Line item not found: {0}")]
    LineNotFound(String),

    /// No check with the given local row id.
    #[error("Check not found: {0}")]
    CheckNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the error came from local input validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements and are
/// raised before any network call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must have at least one entry is empty.
    #[error("at least one {field} is required")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Amount must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// An amount the chosen payment method does not settle with.
    #[error("{field} is not part of a {method} payment")]
    NotAdmitted { field: String, method: String },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        assert_eq!(err.to_string(), "customer_name is required");

        let err = ValidationError::Empty {
            field: "line item".to_string(),
        };
        assert_eq!(err.to_string(), "at least one line item is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Negative {
            field: "discount".to_string(),
        }
        .into();
        assert!(core_err.is_validation());
        assert!(!CoreError::DraftFinalized.is_validation());
    }
}
