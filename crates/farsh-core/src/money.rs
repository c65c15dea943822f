//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The shop backend stores amounts as floats:                             │
//! │    "total_amount": 200000.0                                             │
//! │                                                                         │
//! │  Summing floats line by line drifts:                                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Toman                                            │
//! │    Amounts are whole Toman in an i64. Floats only exist at the          │
//! │    JSON boundary and are rounded once on the way in.                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farsh_core::money::Money;
//!
//! let price = Money::from_units(100_000);
//! let line_total = price.multiply_quantity(2);
//! assert_eq!(line_total.units(), 200_000);
//! assert_eq!(line_total.to_string(), "200,000");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole currency units (Toman).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction is total; flooring happens explicitly
///   through [`Money::floor_zero`] where the invoice rules demand it
/// - **Saturating arithmetic**: `+`, `-`, sums and quantity products clamp
///   at the i64 bounds instead of overflowing
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Lenient deserialize**: accepts the backend's floats and integers
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Carpet.sale_price ──► LineItem.unit_price ──► LineItem.line_total      │
/// │                                                    │                    │
/// │                                                    ▼                    │
/// │            discount ──────────────────────► InvoiceTotals.subtotal      │
/// │                                                    │                    │
/// │  cash_amount + Σ checks ──────────────────► remaining_to_pay            │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use farsh_core::money::Money;
    ///
    /// let over_discounted = Money::from_units(200_000) - Money::from_units(500_000);
    /// assert_eq!(over_discounted.floor_zero(), Money::zero());
    /// ```
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Carpet: Tabriz 6m  100,000
    /// Quantity: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: 200,000
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Builds Money from a backend float, rounding to the nearest unit.
    pub fn from_f64_rounded(value: f64) -> Self {
        Money(value.round() as i64)
    }

    /// Returns the value as a float for spreadsheet cells.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Groups thousands with commas, the way the shop reads prices.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{}", grouped)
        } else {
            write!(f, "{}", grouped)
        }
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Parses operator input: `200000`, `200,000` or `200_000`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
        cleaned
            .parse::<i64>()
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{}' is not a whole amount", s.trim()),
            })
    }
}

/// Accepts `200000`, `200000.0` and `"200000"` from the backend.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a monetary amount")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map(Money)
                    .map_err(|_| E::custom("amount out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                if !v.is_finite() {
                    return Err(E::custom("amount must be finite"));
                }
                Ok(Money::from_f64_rounded(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                let trimmed = v.trim().replace(',', "");
                if let Ok(units) = trimmed.parse::<i64>() {
                    return Ok(Money(units));
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| E::custom(format!("invalid amount: {}", v)))
                    .and_then(|f| self.visit_f64(f))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operator_input() {
        assert_eq!("200000".parse::<Money>().unwrap(), Money::from_units(200_000));
        assert_eq!(" 200,000 ".parse::<Money>().unwrap(), Money::from_units(200_000));
        assert_eq!("1_500".parse::<Money>().unwrap(), Money::from_units(1_500));
        assert!("12.5".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_units(0).to_string(), "0");
        assert_eq!(Money::from_units(999).to_string(), "999");
        assert_eq!(Money::from_units(1_000).to_string(), "1,000");
        assert_eq!(Money::from_units(200_000).to_string(), "200,000");
        assert_eq!(Money::from_units(12_345_678).to_string(), "12,345,678");
        assert_eq!(Money::from_units(-50_000).to_string(), "-50,000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1_000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1_500);
        assert_eq!((a - b).units(), 500);
        assert_eq!((b - a).floor_zero(), Money::zero());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_units(100_000);
        assert_eq!(unit_price.multiply_quantity(2).units(), 200_000);
        assert_eq!(unit_price.multiply_quantity(0), Money::zero());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_units(1_000_000_000_000_000_000);
        assert_eq!(huge.multiply_quantity(10), Money::from_units(i64::MAX));
        assert_eq!(huge + huge, Money::from_units(i64::MAX));
        assert_eq!(Money::from_units(i64::MIN) - huge, Money::from_units(i64::MIN));

        let mut total = huge;
        total += Money::from_units(i64::MAX);
        assert_eq!(total, Money::from_units(i64::MAX));

        let sum: Money = vec![huge; 20].into_iter().sum();
        assert_eq!(sum, Money::from_units(i64::MAX));
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_units(1), Money::from_units(2), Money::from_units(3)];
        let by_ref: Money = amounts.iter().sum();
        let by_val: Money = amounts.into_iter().sum();
        assert_eq!(by_ref, Money::from_units(6));
        assert_eq!(by_val, Money::from_units(6));
    }

    #[test]
    fn test_deserialize_backend_numbers() {
        let from_float: Money = serde_json::from_str("200000.0").unwrap();
        let from_int: Money = serde_json::from_str("200000").unwrap();
        let from_str: Money = serde_json::from_str("\"1,500\"").unwrap();
        let rounded: Money = serde_json::from_str("99.6").unwrap();

        assert_eq!(from_float, Money::from_units(200_000));
        assert_eq!(from_int, Money::from_units(200_000));
        assert_eq!(from_str, Money::from_units(1_500));
        assert_eq!(rounded, Money::from_units(100));
    }

    #[test]
    fn test_serialize_as_integer() {
        let json = serde_json::to_string(&Money::from_units(50_000)).unwrap();
        assert_eq!(json, "50000");
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_units(1).is_positive());
        assert!(Money::from_units(-1).is_negative());
    }
}
