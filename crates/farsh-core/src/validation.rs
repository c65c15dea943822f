//! # Validation Module
//!
//! Input validation for Farsh.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Type checks (numbers, dates, enum values)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any HTTP request)                        │
//! │  ├── Required fields, lengths, ranges                                  │
//! │  └── A failure here means ZERO network calls                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend (FastAPI / pydantic)                                 │
//! │  └── Authoritative; its `detail` message is shown verbatim             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The limits here mirror the backend's own field constraints so that a
//! request we let through is not rejected for a reason we could have caught.
//!
//! ## Usage
//! ```rust
//! use farsh_core::validation::{validate_customer_name, validate_page_limit};
//!
//! assert!(validate_customer_name("Sara Ahmadi").is_ok());
//! assert!(validate_customer_name("   ").is_err());
//! assert!(validate_page_limit(1001).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{
    MAX_AMOUNT, MAX_CHECK_NUMBER_LEN, MAX_NAME_LEN, MAX_PAGE_LIMIT, MAX_SEARCH_LEN,
    MAX_UPCOMING_DAYS, MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates the buyer's name on an invoice.
///
/// ## Rules
/// - Must not be blank (whitespace only counts as blank)
/// - At most 200 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_text("customer_name", name, MAX_NAME_LEN)
}

/// Validates a check number (1-100 characters).
pub fn validate_check_number(number: &str) -> ValidationResult<()> {
    required_text("check_number", number, MAX_CHECK_NUMBER_LEN)
}

/// Validates a check payee (1-200 characters).
pub fn validate_payee(payee: &str) -> ValidationResult<()> {
    required_text("payee", payee, MAX_NAME_LEN)
}

/// Validates a carpet operation name such as "wash" (1-200 characters).
pub fn validate_operation_name(name: &str) -> ValidationResult<()> {
    required_text("operation_name", name, MAX_NAME_LEN)
}

/// Validates and normalizes a catalog search query.
///
/// Returns the trimmed query; an empty query is allowed and means "no filter".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a login name for a new account.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let len = username.trim().chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if len < MIN_USERNAME_LEN || len > MAX_USERNAME_LEN {
        return Err(ValidationError::OutOfRange {
            field: "username length".to_string(),
            min: MIN_USERNAME_LEN as i64,
            max: MAX_USERNAME_LEN as i64,
        });
    }

    Ok(())
}

/// Validates a new password. The backend requires at least 6 characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
        });
    }
    Ok(())
}

/// Minimal email shape check: one `@` with text on both sides and a dot
/// in the domain. The backend does the real validation.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "not an email address".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects negative amounts (discount, cash, check amount, prices) and
/// anything above [`MAX_AMOUNT`].
///
/// ## Example
/// ```rust
/// use farsh_core::money::Money;
/// use farsh_core::validation::validate_amount;
///
/// assert!(validate_amount("discount", Money::from_units(0)).is_ok());
/// assert!(validate_amount("discount", Money::from_units(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if amount.units() > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Validates a page size for list endpoints (1..=1000).
pub fn validate_page_limit(limit: u32) -> ValidationResult<()> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT as i64,
        });
    }
    Ok(())
}

/// Validates the look-ahead window for upcoming checks (1..=90 days).
pub fn validate_upcoming_days(days: u32) -> ValidationResult<()> {
    if days == 0 || days > MAX_UPCOMING_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 1,
            max: MAX_UPCOMING_DAYS as i64,
        });
    }
    Ok(())
}

/// Validates that a date range is not inverted.
pub fn validate_date_range(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "date range".to_string(),
                reason: format!("start {} is after end {}", start, end),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_customer_name() {
        assert!(validate_customer_name("Sara").is_ok());
        assert!(validate_customer_name("علی رضایی").is_ok());

        assert_eq!(
            validate_customer_name(""),
            Err(ValidationError::Required {
                field: "customer_name".to_string()
            })
        );
        assert!(validate_customer_name("  \t ").is_err());
        assert!(validate_customer_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 200 Persian characters are 400 bytes but still within the limit.
        assert!(validate_customer_name(&"س".repeat(200)).is_ok());
    }

    #[test]
    fn test_amount() {
        assert!(validate_amount("cash", Money::zero()).is_ok());
        assert!(validate_amount("cash", Money::from_units(50_000)).is_ok());
        assert!(matches!(
            validate_amount("cash", Money::from_units(-1)),
            Err(ValidationError::Negative { .. })
        ));
        assert!(validate_amount("cash", Money::from_units(MAX_AMOUNT)).is_ok());
        assert!(matches!(
            validate_amount("unit_price", Money::from_units(MAX_AMOUNT + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_page_limit_and_days() {
        assert!(validate_page_limit(1).is_ok());
        assert!(validate_page_limit(1000).is_ok());
        assert!(validate_page_limit(0).is_err());
        assert!(validate_page_limit(1001).is_err());

        assert!(validate_upcoming_days(7).is_ok());
        assert!(validate_upcoming_days(0).is_err());
        assert!(validate_upcoming_days(91).is_err());
    }

    #[test]
    fn test_search_query_trims() {
        assert_eq!(validate_search_query("  kashan ").unwrap(), "kashan");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_account_fields() {
        assert!(validate_username("ali").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_email("owner@farsh.ir").is_ok());
        assert!(validate_email("owner").is_err());
        assert!(validate_email("@farsh.ir").is_err());
    }

    #[test]
    fn test_date_range() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1);
        let b = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(validate_date_range(a, b).is_ok());
        assert!(validate_date_range(b, a).is_err());
        assert!(validate_date_range(None, a).is_ok());
    }
}
