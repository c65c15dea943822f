//! # Domain Types
//!
//! Types shared by every Farsh crate: the backend's enumerations and the
//! records it returns.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Carpet      │   │  InvoiceRecord  │   │   CheckRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (backend)   │   │  id (backend)   │   │  id (backend)   │       │
//! │  │  pattern        │   │  invoice_number │   │  check_number   │       │
//! │  │  size           │   │  items[]        │   │  status         │       │
//! │  │  sale_price     │   │  total_amount   │   │  invoice_id(FK) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CarpetSize    │   │  PaymentMethod  │   │   CheckStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  10 fixed sizes │   │  Cash           │   │  NotRegistered  │       │
//! │  │  (Persian wire  │   │  Check          │   │  Registered     │       │
//! │  │   values)       │   │  Mixed          │   │  Confirmed ...  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! The backend owns every persistent identifier (integers). The only ids
//! minted client-side are the local row ids inside an `InvoiceDraft`.
//!
//! ## Wire Values
//! The backend's enums serialize as Persian strings (`"نقدی"`, `"ورودی"`).
//! Every enum here keeps that exact wire value through `serde(rename)` and
//! additionally parses a Latin alias (`cash`, `incoming`) for the CLI.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Generates `as_wire`, `Display` and a `FromStr` accepting either the wire
/// value or the Latin alias of each variant.
macro_rules! wire_enum {
    ($name:ident, $field:literal, { $($variant:ident => ($wire:literal, $alias:literal)),+ $(,)? }) => {
        impl $name {
            /// Every variant, in the backend's declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The exact string the backend stores.
            pub const fn as_wire(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// The Latin alias accepted on the command line.
            pub const fn alias(&self) -> &'static str {
                match self {
                    $($name::$variant => $alias),+
                }
            }

            /// Parses a backend wire value, returning `None` for anything else.
            pub fn from_wire(value: &str) -> Option<Self> {
                match value.trim() {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Some(v) = Self::from_wire(s) {
                    return Ok(v);
                }
                let lowered = s.trim().to_lowercase();
                match lowered.as_str() {
                    $($alias => Ok($name::$variant),)+
                    _ => Err(ValidationError::InvalidFormat {
                        field: $field.to_string(),
                        reason: format!("unknown value '{}'", s),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// Carpet Size
// =============================================================================

/// The shop's fixed carpet size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CarpetSize {
    #[serde(rename = "کوچیک")]
    Small,
    #[serde(rename = "پشتی")]
    Poshti,
    #[serde(rename = "زرچارک")]
    Zarcharak,
    #[serde(rename = "زرنیم")]
    Zarnim,
    #[serde(rename = "قالیچه")]
    Ghalicheh,
    #[serde(rename = "پرده‌ای")]
    Pardei,
    #[serde(rename = "شش متری")]
    SixMeter,
    #[serde(rename = "نه متری")]
    NineMeter,
    #[serde(rename = "12 متری")]
    TwelveMeter,
    #[serde(rename = "بزرگ‌تر")]
    Larger,
}

wire_enum!(CarpetSize, "size", {
    Small => ("کوچیک", "small"),
    Poshti => ("پشتی", "poshti"),
    Zarcharak => ("زرچارک", "zarcharak"),
    Zarnim => ("زرنیم", "zarnim"),
    Ghalicheh => ("قالیچه", "ghalicheh"),
    Pardei => ("پرده‌ای", "pardei"),
    SixMeter => ("شش متری", "6m"),
    NineMeter => ("نه متری", "9m"),
    TwelveMeter => ("12 متری", "12m"),
    Larger => ("بزرگ‌تر", "larger"),
});

// =============================================================================
// Payment Method
// =============================================================================

/// How an invoice is settled.
///
/// ## Which amounts count
/// ```text
///   Method   │ cash_amount │ checks
///   ─────────┼─────────────┼────────
///   Cash     │     ✅      │   ❌
///   Check    │     ❌      │   ✅
///   Mixed    │     ✅      │   ✅
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    #[serde(rename = "نقدی")]
    Cash,
    #[serde(rename = "چک")]
    Check,
    #[serde(rename = "ترکیبی")]
    Mixed,
}

wire_enum!(PaymentMethod, "payment_method", {
    Cash => ("نقدی", "cash"),
    Check => ("چک", "check"),
    Mixed => ("ترکیبی", "mixed"),
});

impl PaymentMethod {
    /// Whether the cash amount is part of the settlement.
    #[inline]
    pub const fn admits_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Mixed)
    }

    /// Whether checks are part of the settlement.
    #[inline]
    pub const fn admits_checks(&self) -> bool {
        matches!(self, PaymentMethod::Check | PaymentMethod::Mixed)
    }

    /// The narrowest method that admits the given kinds of payment.
    pub const fn for_amounts(has_cash: bool, has_checks: bool) -> Self {
        match (has_cash, has_checks) {
            (true, true) => PaymentMethod::Mixed,
            (false, true) => PaymentMethod::Check,
            _ => PaymentMethod::Cash,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Carpet Purchase Method
// =============================================================================

/// How the shop paid for a carpet. Unlike invoices, purchases may be
/// paid in installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PurchaseMethod {
    #[serde(rename = "نقدی")]
    Cash,
    #[serde(rename = "چک")]
    Check,
    #[serde(rename = "قسطی")]
    Installment,
    #[serde(rename = "ترکیبی")]
    Mixed,
}

wire_enum!(PurchaseMethod, "payment_method", {
    Cash => ("نقدی", "cash"),
    Check => ("چک", "check"),
    Installment => ("قسطی", "installment"),
    Mixed => ("ترکیبی", "mixed"),
});

// =============================================================================
// Check Direction & Status
// =============================================================================

/// Whether a check was received (from a customer) or issued (to a supplier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CheckDirection {
    #[serde(rename = "ورودی")]
    Incoming,
    #[serde(rename = "خروجی")]
    Outgoing,
}

wire_enum!(CheckDirection, "check_type", {
    Incoming => ("ورودی", "incoming"),
    Outgoing => ("خروجی", "outgoing"),
});

/// Lifecycle status of a persisted check.
///
/// The usual order is NotRegistered → Registered → Confirmed → Passed, with
/// Bounced reachable from anywhere. No transition is enforced client-side:
/// the backend is the only arbiter, so any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CheckStatus {
    #[serde(rename = "ثبت نشده")]
    NotRegistered,
    #[serde(rename = "ثبت شده")]
    Registered,
    #[serde(rename = "تایید شده")]
    Confirmed,
    #[serde(rename = "پاس شده")]
    Passed,
    #[serde(rename = "برگشت خورده")]
    Bounced,
}

wire_enum!(CheckStatus, "status", {
    NotRegistered => ("ثبت نشده", "unregistered"),
    Registered => ("ثبت شده", "registered"),
    Confirmed => ("تایید شده", "confirmed"),
    Passed => ("پاس شده", "passed"),
    Bounced => ("برگشت خورده", "bounced"),
});

impl CheckStatus {
    /// Passed and Bounced end the typical lifecycle.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CheckStatus::Passed | CheckStatus::Bounced)
    }
}

// =============================================================================
// User Role
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including user administration.
    Admin,
    /// Day-to-day shop operator.
    User,
}

wire_enum!(UserRole, "role", {
    Admin => ("admin", "admin"),
    User => ("user", "user"),
});

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

// =============================================================================
// Report Period
// =============================================================================

/// The fixed look-back windows the backend aggregates financial reports for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

wire_enum!(ReportPeriod, "period", {
    Daily => ("daily", "day"),
    Weekly => ("weekly", "week"),
    Monthly => ("monthly", "month"),
    Quarterly => ("quarterly", "quarter"),
    SemiAnnual => ("semi-annual", "half-year"),
    Annual => ("annual", "year"),
});

// =============================================================================
// Carpet (catalog entry)
// =============================================================================

/// A catalog entry as listed by `GET carpets`.
///
/// This is the read-only shape the invoice screen selects from; selecting
/// one copies its fields into a line item (see `InvoiceDraft`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Carpet {
    pub id: i64,
    /// Pattern name (نقشه). Shown as the line title.
    pub pattern: String,
    pub brand: String,
    pub material: String,
    pub size: CarpetSize,
    /// Units in stock.
    pub quantity: u32,
    /// Not every carpet has a sale price yet.
    pub sale_price: Option<Money>,
    pub image_path: Option<String>,
    pub is_consignment: bool,
}

impl Carpet {
    /// Title used when the carpet is put on an invoice.
    ///
    /// Falls back to `"brand - size"` for carpets without a pattern name.
    pub fn display_title(&self) -> String {
        let pattern = self.pattern.trim();
        if pattern.is_empty() {
            format!("{} - {}", self.brand, self.size)
        } else {
            pattern.to_string()
        }
    }

    /// Whether at least one unit is in stock.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// A cost incurred on a carpet after purchase (wash, repair, restoration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CarpetOperation {
    pub id: i64,
    pub carpet_id: i64,
    pub operation_name: String,
    pub price: Money,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub operation_date: NaiveDateTime,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    #[ts(as = "String")]
    pub updated_at: NaiveDateTime,
}

/// The full carpet record returned by `GET carpets/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CarpetDetail {
    pub id: i64,
    pub pattern: String,
    pub brand: String,
    pub material: String,
    pub size: CarpetSize,
    pub quantity: u32,
    pub description: Option<String>,
    #[serde(default)]
    pub has_pair: bool,
    pub payment_method: PurchaseMethod,
    pub purchase_price: Money,
    pub sale_price: Option<Money>,
    #[ts(as = "String")]
    pub purchase_date: NaiveDateTime,
    pub image_path: Option<String>,
    pub seller_name: Option<String>,
    pub is_consignment: bool,
    pub consignment_owner: Option<String>,
    pub owner_declared_price: Option<Money>,
    #[ts(as = "Option<String>")]
    pub consignment_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub operations: Vec<CarpetOperation>,
    pub total_operations_cost: Money,
    pub total_cost: Money,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    #[ts(as = "String")]
    pub updated_at: NaiveDateTime,
}

impl CarpetDetail {
    /// Narrows the detail record to the catalog-entry shape.
    pub fn summary(&self) -> Carpet {
        Carpet {
            id: self.id,
            pattern: self.pattern.clone(),
            brand: self.brand.clone(),
            material: self.material.clone(),
            size: self.size,
            quantity: self.quantity,
            sale_price: self.sale_price,
            image_path: self.image_path.clone(),
            is_consignment: self.is_consignment,
        }
    }
}

// =============================================================================
// Invoices
// =============================================================================

/// One row of `GET invoices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDateTime,
    pub total_amount: Money,
    pub is_signed: bool,
}

/// A persisted invoice line. Totals are computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceItemRecord {
    pub id: i64,
    pub invoice_id: i64,
    pub carpet_id: Option<i64>,
    pub title: String,
    pub size: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
    pub description: Option<String>,
}

/// A persisted invoice as returned by `GET invoices/{id}`.
///
/// `payment_method` is kept as the raw string: the backend stores it as free
/// text, so older rows may carry values outside [`PaymentMethod`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceRecord {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    pub payment_method: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub invoice_date: NaiveDateTime,
    pub total_amount: Money,
    pub signature_path: Option<String>,
    pub is_signed: bool,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    #[ts(as = "String")]
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub items: Vec<InvoiceItemRecord>,
}

impl InvoiceRecord {
    /// The payment method, when it is one of the known values.
    pub fn payment(&self) -> Option<PaymentMethod> {
        PaymentMethod::from_wire(&self.payment_method)
    }
}

// =============================================================================
// Checks
// =============================================================================

/// A persisted check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckRecord {
    pub id: i64,
    pub check_number: String,
    pub amount: Money,
    pub payee: String,
    #[ts(as = "String")]
    pub check_date: NaiveDateTime,
    pub check_type: CheckDirection,
    pub status: CheckStatus,
    pub description: Option<String>,
    pub invoice_id: Option<i64>,
    pub carpet_id: Option<i64>,
    #[ts(as = "Option<String>")]
    pub notification_sent: Option<NaiveDateTime>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    #[ts(as = "String")]
    pub updated_at: NaiveDateTime,
}

// =============================================================================
// Users
// =============================================================================

/// A shop account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    #[ts(as = "Option<String>")]
    pub last_login: Option<NaiveDateTime>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Pre-aggregated financial figures for a period. Consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialReport {
    pub total_revenue: Money,
    pub total_cost: Money,
    pub profit: Money,
    pub total_invoices: u64,
    pub total_sold_carpets: u64,
    pub total_incoming_checks: Money,
    pub total_outgoing_checks: Money,
    pub net_check_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeCount {
    /// Raw size label; kept as text so unknown sizes still render.
    pub size: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialCount {
    pub material: String,
    pub count: u64,
}

/// Stock snapshot from `GET reports/inventory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryReport {
    pub total_carpets: u64,
    pub total_inventory_value: Money,
    #[serde(default)]
    pub by_size: Vec<SizeCount>,
    #[serde(default)]
    pub by_material: Vec<MaterialCount>,
    pub consignment_count: u64,
    pub owned_count: u64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_values() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Mixed).unwrap(),
            "\"ترکیبی\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"چک\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Check);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_method_admits() {
        assert!(PaymentMethod::Cash.admits_cash());
        assert!(!PaymentMethod::Cash.admits_checks());
        assert!(!PaymentMethod::Check.admits_cash());
        assert!(PaymentMethod::Check.admits_checks());
        assert!(PaymentMethod::Mixed.admits_cash());
        assert!(PaymentMethod::Mixed.admits_checks());

        assert_eq!(PaymentMethod::for_amounts(false, false), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::for_amounts(true, false), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::for_amounts(false, true), PaymentMethod::Check);
        assert_eq!(PaymentMethod::for_amounts(true, true), PaymentMethod::Mixed);
    }

    #[test]
    fn test_from_str_accepts_alias_and_wire() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("MIXED".parse::<PaymentMethod>().unwrap(), PaymentMethod::Mixed);
        assert_eq!("نقدی".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("bounced".parse::<CheckStatus>().unwrap(), CheckStatus::Bounced);
        assert_eq!("6m".parse::<CarpetSize>().unwrap(), CarpetSize::SixMeter);

        let err = "card".parse::<PaymentMethod>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_carpet_size_round_trips_every_wire_value() {
        assert_eq!(CarpetSize::ALL.len(), 10);
        for size in CarpetSize::ALL {
            let json = serde_json::to_string(size).unwrap();
            assert_eq!(json, format!("\"{}\"", size.as_wire()));
        }
    }

    #[test]
    fn test_report_period_path_segment() {
        assert_eq!(ReportPeriod::SemiAnnual.as_wire(), "semi-annual");
        assert_eq!(
            serde_json::to_string(&ReportPeriod::SemiAnnual).unwrap(),
            "\"semi-annual\""
        );
    }

    #[test]
    fn test_carpet_deserializes_backend_row() {
        let json = r#"{
            "id": 7, "pattern": "", "brand": "Kashan", "material": "wool",
            "size": "شش متری", "quantity": 3, "sale_price": 12500000.0,
            "image_path": null, "is_consignment": false
        }"#;
        let carpet: Carpet = serde_json::from_str(json).unwrap();

        assert_eq!(carpet.sale_price, Some(Money::from_units(12_500_000)));
        assert_eq!(carpet.display_title(), "Kashan - شش متری");
        assert!(carpet.is_available());
    }

    #[test]
    fn test_invoice_record_unknown_payment_method() {
        let json = r#"{
            "id": 1, "invoice_number": "INV-1", "customer_name": "Sara",
            "payment_method": "کارت", "description": null,
            "invoice_date": "2024-03-20T00:00:00", "total_amount": 200000.0,
            "signature_path": null, "is_signed": false,
            "created_at": "2024-03-20T10:00:00.123456",
            "updated_at": "2024-03-20T10:00:00.123456",
            "last_edited_at": "2024-03-20T10:00:00.123456",
            "items": []
        }"#;
        let record: InvoiceRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.payment(), None);
        assert_eq!(record.total_amount, Money::from_units(200_000));
    }

    #[test]
    fn test_check_status_terminal() {
        assert!(CheckStatus::Passed.is_terminal());
        assert!(CheckStatus::Bounced.is_terminal());
        assert!(!CheckStatus::Registered.is_terminal());
    }
}
