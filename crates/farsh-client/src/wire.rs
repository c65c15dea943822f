//! # Request Payloads & Filters
//!
//! Shapes the client sends. Responses are the records in `farsh_core::types`.
//!
//! ```text
//!   InvoiceDraft ──► InvoicePayload ──► POST invoices/ | PUT invoices/{id}
//!   CheckDraft   ──► NewCheck       ──► POST checks/   (no status field)
//!   CarpetFilter ──► Query          ──► GET carpets?search=..&size=..
//! ```
//!
//! Optional fields are omitted rather than sent as `null` so the backend's
//! own defaults apply.

use chrono::NaiveDate;
use farsh_core::{
    CarpetSize, CheckDirection, CheckDraft, CheckStatus, InvoiceDraft, Money, PaymentMethod,
    PurchaseMethod, UserRole,
};
use serde::Serialize;

use crate::api::{push_opt, Query};

// =============================================================================
// Invoices
// =============================================================================

/// One invoice line as the backend expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceItemPayload {
    pub carpet_id: Option<i64>,
    pub title: String,
    pub size: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub description: String,
}

/// Body of both the create and the update request.
///
/// Discount and cash are client-side figures; the backend has no field for
/// them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayload {
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub invoice_date: NaiveDate,
    pub items: Vec<InvoiceItemPayload>,
}

impl From<&InvoiceDraft> for InvoicePayload {
    fn from(draft: &InvoiceDraft) -> Self {
        InvoicePayload {
            customer_name: draft.customer_name().trim().to_string(),
            payment_method: draft.payment_method(),
            description: draft.notes().to_string(),
            invoice_date: draft.invoice_date(),
            items: draft
                .lines()
                .iter()
                .map(|line| InvoiceItemPayload {
                    carpet_id: line.catalog_ref,
                    title: line.title.clone(),
                    size: line.size.clone(),
                    brand: line.brand.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    description: String::new(),
                })
                .collect(),
        }
    }
}

/// Filters for `GET invoices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    pub customer_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl InvoiceFilter {
    pub fn to_query(&self) -> Query {
        let mut q = Query::new();
        push_opt(&mut q, "customer_name", self.customer_name.as_deref());
        push_opt(&mut q, "start_date", self.start_date);
        push_opt(&mut q, "end_date", self.end_date);
        push_opt(&mut q, "skip", self.skip);
        push_opt(&mut q, "limit", self.limit);
        q
    }
}

// =============================================================================
// Checks
// =============================================================================

/// Body of `POST checks/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCheck {
    pub check_number: String,
    pub amount: Money,
    pub payee: String,
    pub check_date: NaiveDate,
    pub check_type: CheckDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carpet_id: Option<i64>,
    /// Left out for invoice checks so the backend assigns its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckStatus>,
}

impl NewCheck {
    /// The registration request for a check handed over with an invoice:
    /// always incoming, payee defaulting to the customer, no status.
    pub fn for_invoice(draft: &InvoiceDraft, check: &CheckDraft, invoice_id: i64) -> Self {
        NewCheck {
            check_number: check.check_number.trim().to_string(),
            amount: check.amount,
            payee: draft.payee_for(check).to_string(),
            check_date: check.due_date,
            check_type: check.direction(),
            description: None,
            invoice_id: Some(invoice_id),
            carpet_id: None,
            status: None,
        }
    }
}

/// Body of `PUT checks/{id}`; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_type: Option<CheckDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CheckUpdate {
    /// The partial update that only changes the status.
    pub fn status(status: CheckStatus) -> Self {
        CheckUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == CheckUpdate::default()
    }
}

/// Filters for `GET checks`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckFilter {
    pub invoice_id: Option<i64>,
    pub check_type: Option<CheckDirection>,
    pub status: Option<CheckStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl CheckFilter {
    pub fn to_query(&self) -> Query {
        let mut q = Query::new();
        push_opt(&mut q, "invoice_id", self.invoice_id);
        push_opt(&mut q, "check_type", self.check_type.map(|t| t.as_wire()));
        push_opt(&mut q, "status", self.status.map(|s| s.as_wire()));
        push_opt(&mut q, "start_date", self.start_date);
        push_opt(&mut q, "end_date", self.end_date);
        push_opt(&mut q, "skip", self.skip);
        push_opt(&mut q, "limit", self.limit);
        q
    }
}

// =============================================================================
// Carpets
// =============================================================================

/// Filters for `GET carpets` and the server-side PDF export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarpetFilter {
    pub search: Option<String>,
    pub size: Option<CarpetSize>,
    pub material: Option<String>,
    pub available_only: bool,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl CarpetFilter {
    /// Query without paging; the export endpoint takes no skip/limit.
    pub fn filter_query(&self) -> Query {
        let mut q = Query::new();
        push_opt(
            &mut q,
            "search",
            self.search.as_deref().filter(|s| !s.is_empty()),
        );
        push_opt(&mut q, "size", self.size.map(|s| s.as_wire()));
        push_opt(
            &mut q,
            "material",
            self.material.as_deref().filter(|s| !s.is_empty()),
        );
        if self.available_only {
            q.push(("available_only", "true".to_string()));
        }
        q
    }

    pub fn to_query(&self) -> Query {
        let mut q = self.filter_query();
        push_opt(&mut q, "skip", self.skip);
        push_opt(&mut q, "limit", self.limit);
        q
    }
}

/// Body of `POST carpets/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCarpet {
    pub pattern: String,
    pub brand: String,
    pub material: String,
    pub size: CarpetSize,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub has_pair: bool,
    pub payment_method: PurchaseMethod,
    pub purchase_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    pub is_consignment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consignment_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_declared_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consignment_date: Option<NaiveDate>,
}

/// Body of `PUT carpets/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CarpetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<CarpetSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_pair: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PurchaseMethod>,
}

impl CarpetUpdate {
    pub fn is_empty(&self) -> bool {
        *self == CarpetUpdate::default()
    }
}

/// Body of `POST carpets/{id}/operations` and `PUT carpets/operations/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOperation {
    pub operation_name: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_date: Option<NaiveDate>,
}

// =============================================================================
// Users & Reports
// =============================================================================

/// Body of `POST auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub password: String,
    pub role: UserRole,
}

/// Body of `PUT users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body of `POST reports/financial`. Open ends mean "unbounded".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use farsh_core::LineItem;
    use serde_json::json;

    fn draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        draft.set_customer_name("  Sara ").unwrap();
        draft.set_payment_method(PaymentMethod::Mixed).unwrap();
        draft.set_notes("deliver Friday").unwrap();
        let mut line = LineItem::freeform("Tabriz", 2, Money::from_units(100_000));
        line.catalog_ref = Some(7);
        line.size = "شش متری".into();
        line.brand = "Kashan".into();
        draft.add_line(line).unwrap();
        draft
    }

    #[test]
    fn test_invoice_payload_shape() {
        let value = serde_json::to_value(InvoicePayload::from(&draft())).unwrap();
        assert_eq!(
            value,
            json!({
                "customer_name": "Sara",
                "payment_method": "ترکیبی",
                "description": "deliver Friday",
                "invoice_date": "2024-03-20",
                "items": [{
                    "carpet_id": 7,
                    "title": "Tabriz",
                    "size": "شش متری",
                    "brand": "Kashan",
                    "quantity": 2,
                    "unit_price": 100000,
                    "description": ""
                }]
            })
        );
    }

    #[test]
    fn test_invoice_check_has_no_status() {
        let draft = draft();
        let check = CheckDraft::new("778899", Money::from_units(50_000), draft.invoice_date());
        let value = serde_json::to_value(NewCheck::for_invoice(&draft, &check, 12)).unwrap();

        assert_eq!(
            value,
            json!({
                "check_number": "778899",
                "amount": 50000,
                "payee": "Sara",
                "check_date": "2024-03-20",
                "check_type": "ورودی",
                "invoice_id": 12
            })
        );
    }

    #[test]
    fn test_status_update_is_partial() {
        let value = serde_json::to_value(CheckUpdate::status(CheckStatus::Passed)).unwrap();
        assert_eq!(value, json!({ "status": "پاس شده" }));
        assert!(CheckUpdate::default().is_empty());
    }

    #[test]
    fn test_carpet_filter_query() {
        let filter = CarpetFilter {
            search: Some("afshan".into()),
            size: Some(CarpetSize::NineMeter),
            material: Some(String::new()),
            available_only: true,
            skip: Some(100),
            limit: Some(50),
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("search", "afshan".to_string()),
                ("size", "نه متری".to_string()),
                ("available_only", "true".to_string()),
                ("skip", "100".to_string()),
                ("limit", "50".to_string()),
            ]
        );
        assert_eq!(filter.filter_query().len(), 3);
    }

    #[test]
    fn test_check_filter_query() {
        let filter = CheckFilter {
            status: Some(CheckStatus::Bounced),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("status", "برگشت خورده".to_string()),
                ("start_date", "2024-01-01".to_string()),
            ]
        );
    }
}
