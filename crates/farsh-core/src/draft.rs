//! # Invoice Draft
//!
//! The in-memory invoice being composed on the invoice screen, and every
//! figure derived from it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Invoice Draft State Machine                          │
//! │                                                                         │
//! │   ┌─────────┐   mark_saved(id)   ┌─────────────┐                        │
//! │   │   NEW   │ ─────────────────► │ DRAFT_SAVED │ ◄──┐ mark_saved(id)    │
//! │   │(no id)  │                    │ (server_id) │ ───┘ (same record)     │
//! │   └────┬────┘                    └──────┬──────┘                        │
//! │        │                                │                               │
//! │        │   create + mark_saved(id)      │ mark_finalized()              │
//! │        └──────────────────────┐         │                               │
//! │                               ▼         ▼                               │
//! │                           ┌─────────────────┐                           │
//! │                           │    FINALIZED    │  terminal, read-only      │
//! │                           └─────────────────┘                           │
//! │                                                                         │
//! │  NEW and DRAFT_SAVED are editable. Every mutator on a FINALIZED draft   │
//! │  returns CoreError::DraftFinalized and leaves the draft untouched.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Amounts
//! ```text
//!   subtotal         = Σ quantity × unit_price
//!   after_discount   = max(subtotal − discount, 0)
//!   total            = after_discount
//!   checks_total     = Σ amount over checks
//!   remaining_to_pay = max(total − cash_amount − checks_total, 0)
//! ```
//! Every entered amount counts. [`InvoiceDraft::validate_for_submit`] refuses
//! cash or checks the payment method does not admit, so a submitted draft
//! never carries amounts that Finalize would leave unregistered.
//! `remaining_to_pay` is informational: nothing refuses to finalize an
//! invoice that is not fully paid.
//!
//! The network side (Save Draft, Finalize) lives in `farsh-client`; this
//! module only records the outcome through [`InvoiceDraft::mark_saved`] and
//! [`InvoiceDraft::mark_finalized`].

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Carpet, CheckDirection, CheckRecord, InvoiceRecord, PaymentMethod};
use crate::validation::{validate_amount, validate_customer_name};

// =============================================================================
// Line Item
// =============================================================================

/// One row of the invoice.
///
/// ## Snapshot, not link
/// `title`, `size`, `brand` and `unit_price` are copied from the catalog when
/// a carpet is selected and stay editable afterwards. A later price change in
/// the catalog never reaches a line that already exists.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Local row id, used to address edits. Never sent to the backend.
    #[ts(as = "String")]
    pub row_id: Uuid,
    /// Catalog carpet this line was taken from, if any.
    pub catalog_ref: Option<i64>,
    pub title: String,
    pub size: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    /// A free-text line not tied to any catalog entry.
    pub fn freeform(title: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            row_id: Uuid::new_v4(),
            catalog_ref: None,
            title: title.into(),
            size: String::new(),
            brand: String::new(),
            quantity,
            unit_price,
        }
    }

    /// A line snapshotted from a catalog entry.
    pub fn from_carpet(carpet: &Carpet, quantity: u32) -> Self {
        let mut line = Self::freeform(String::new(), quantity, Money::zero());
        line.apply_carpet(carpet);
        line
    }

    /// quantity × unit_price. Always recomputed, never stored.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    fn apply_carpet(&mut self, carpet: &Carpet) {
        self.catalog_ref = Some(carpet.id);
        self.title = carpet.display_title();
        self.size = carpet.size.as_wire().to_string();
        self.brand = carpet.brand.clone();
        self.unit_price = carpet.sale_price.unwrap_or_default();
    }
}

/// A single-field change to a line item.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEdit {
    Title(String),
    Size(String),
    Brand(String),
    Quantity(u32),
    UnitPrice(Money),
    /// Detach from (None) or re-point at a catalog id without copying fields.
    CatalogRef(Option<i64>),
}

// =============================================================================
// Check Draft
// =============================================================================

/// A check the customer hands over as (part) payment.
///
/// Invoice checks are always incoming; the status is left for the backend
/// to assign when the check is registered during Finalize.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CheckDraft {
    #[ts(as = "String")]
    pub row_id: Uuid,
    pub check_number: String,
    pub amount: Money,
    /// Falls back to the invoice's customer name when unset.
    pub payee: Option<String>,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
}

impl CheckDraft {
    pub fn new(check_number: impl Into<String>, amount: Money, due_date: NaiveDate) -> Self {
        Self {
            row_id: Uuid::new_v4(),
            check_number: check_number.into(),
            amount,
            payee: None,
            due_date,
        }
    }

    /// Builder-style payee override.
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    /// Invoice-originated checks are always received from the customer.
    #[inline]
    pub const fn direction(&self) -> CheckDirection {
        CheckDirection::Incoming
    }
}

/// A single-field change to a check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckEdit {
    Number(String),
    Amount(Money),
    Payee(Option<String>),
    DueDate(NaiveDate),
}

// =============================================================================
// Draft State & Totals
// =============================================================================

/// Where the draft is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    /// Never persisted.
    New,
    /// Persisted as a draft; editable.
    DraftSaved,
    /// Committed; read-only.
    Finalized,
}

/// Every figure shown for an invoice: on screen, in the PDF and in the
/// spreadsheet. There is exactly one place these are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub after_discount: Money,
    pub total: Money,
    /// Cash received.
    pub cash_amount: Money,
    /// Sum of every check amount.
    pub checks_total: Money,
    pub remaining_to_pay: Money,
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// The invoice under construction.
///
/// Fields are private so that the finalize guard cannot be bypassed; read
/// them through the accessors and change them through the mutators.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use farsh_core::draft::{InvoiceDraft, LineItem};
/// use farsh_core::money::Money;
///
/// let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
/// draft.set_customer_name("Sara").unwrap();
/// draft.add_line(LineItem::freeform("Tabriz", 2, Money::from_units(100_000))).unwrap();
///
/// assert_eq!(draft.totals().total, Money::from_units(200_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InvoiceDraft {
    customer_name: String,
    #[ts(as = "String")]
    invoice_date: NaiveDate,
    payment_method: PaymentMethod,
    lines: Vec<LineItem>,
    discount: Money,
    cash_amount: Money,
    checks: Vec<CheckDraft>,
    notes: String,
    server_id: Option<i64>,
    finalized: bool,
}

impl InvoiceDraft {
    /// An empty draft dated `today`. Payment defaults to cash.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            customer_name: String::new(),
            invoice_date: today,
            payment_method: PaymentMethod::default(),
            lines: Vec::new(),
            discount: Money::zero(),
            cash_amount: Money::zero(),
            checks: Vec::new(),
            notes: String::new(),
            server_id: None,
            finalized: false,
        }
    }

    /// Rebuilds a draft from a persisted invoice and its checks, e.g. to
    /// export it again.
    ///
    /// The backend stores neither the discount nor the cash amount, so both
    /// come back as zero. The result is in `DraftSaved`; call
    /// [`mark_finalized`](Self::mark_finalized) when the invoice is known to
    /// be final.
    pub fn from_record(record: &InvoiceRecord, checks: &[CheckRecord]) -> Self {
        let own_checks: Vec<CheckDraft> = checks
            .iter()
            .filter(|c| c.invoice_id == Some(record.id))
            .map(|c| CheckDraft {
                row_id: Uuid::new_v4(),
                check_number: c.check_number.clone(),
                amount: c.amount,
                payee: Some(c.payee.clone()),
                due_date: c.check_date.date(),
            })
            .collect();

        let payment_method = record
            .payment()
            .unwrap_or(PaymentMethod::for_amounts(false, !own_checks.is_empty()));

        let lines = record
            .items
            .iter()
            .map(|item| LineItem {
                row_id: Uuid::new_v4(),
                catalog_ref: item.carpet_id,
                title: item.title.clone(),
                size: item.size.clone(),
                brand: item.brand.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        Self {
            customer_name: record.customer_name.clone(),
            invoice_date: record.invoice_date.date(),
            payment_method,
            lines,
            discount: Money::zero(),
            cash_amount: Money::zero(),
            checks: own_checks,
            notes: record.description.clone().unwrap_or_default(),
            server_id: Some(record.id),
            finalized: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Line items in display (insertion) order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, row_id: Uuid) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.row_id == row_id)
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    /// The cash amount as entered, whether or not the method counts it.
    pub fn cash_amount(&self) -> Money {
        self.cash_amount
    }

    /// All checks as entered, whether or not the method counts them.
    pub fn checks(&self) -> &[CheckDraft] {
        &self.checks
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn server_id(&self) -> Option<i64> {
        self.server_id
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn state(&self) -> DraftState {
        match (self.finalized, self.server_id) {
            (true, _) => DraftState::Finalized,
            (false, Some(_)) => DraftState::DraftSaved,
            (false, None) => DraftState::New,
        }
    }

    /// The payee a check will be registered under.
    pub fn payee_for<'a>(&'a self, check: &'a CheckDraft) -> &'a str {
        match check.payee.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => self.customer_name.trim(),
        }
    }

    // -------------------------------------------------------------------------
    // Derived amounts
    // -------------------------------------------------------------------------

    /// Computes every derived figure.
    pub fn totals(&self) -> InvoiceTotals {
        let subtotal: Money = self.lines.iter().map(LineItem::line_total).sum();
        let after_discount = (subtotal - self.discount).floor_zero();
        let total = after_discount;
        let cash_amount = self.cash_amount;
        let checks_total: Money = self.checks.iter().map(|c| c.amount).sum();
        let remaining_to_pay = (total - cash_amount - checks_total).floor_zero();

        InvoiceTotals {
            subtotal,
            discount: self.discount,
            after_discount,
            total,
            cash_amount,
            checks_total,
            remaining_to_pay,
        }
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    fn ensure_editable(&self) -> CoreResult<()> {
        if self.finalized {
            return Err(CoreError::DraftFinalized);
        }
        Ok(())
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) -> CoreResult<()> {
        self.ensure_editable()?;
        self.customer_name = name.into();
        Ok(())
    }

    pub fn set_invoice_date(&mut self, date: NaiveDate) -> CoreResult<()> {
        self.ensure_editable()?;
        self.invoice_date = date;
        Ok(())
    }

    /// Switching method keeps the entered cash and checks; it only changes
    /// which of them count.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> CoreResult<()> {
        self.ensure_editable()?;
        self.payment_method = method;
        Ok(())
    }

    /// Sets the absolute discount. May exceed the subtotal.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        self.ensure_editable()?;
        validate_amount("discount", discount)?;
        self.discount = discount;
        Ok(())
    }

    pub fn set_cash_amount(&mut self, cash: Money) -> CoreResult<()> {
        self.ensure_editable()?;
        validate_amount("cash_amount", cash)?;
        self.cash_amount = cash;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> CoreResult<()> {
        self.ensure_editable()?;
        self.notes = notes.into();
        Ok(())
    }

    /// Appends a line and returns its row id.
    pub fn add_line(&mut self, line: LineItem) -> CoreResult<Uuid> {
        self.ensure_editable()?;
        validate_amount("unit_price", line.unit_price)?;
        let row_id = line.row_id;
        self.lines.push(line);
        Ok(row_id)
    }

    pub fn remove_line(&mut self, row_id: Uuid) -> CoreResult<LineItem> {
        self.ensure_editable()?;
        let index = self.line_index(row_id)?;
        Ok(self.lines.remove(index))
    }

    pub fn edit_line(&mut self, row_id: Uuid, edit: LineEdit) -> CoreResult<()> {
        self.ensure_editable()?;
        if let LineEdit::UnitPrice(price) = &edit {
            validate_amount("unit_price", *price)?;
        }
        let index = self.line_index(row_id)?;
        let line = &mut self.lines[index];
        match edit {
            LineEdit::Title(v) => line.title = v,
            LineEdit::Size(v) => line.size = v,
            LineEdit::Brand(v) => line.brand = v,
            LineEdit::Quantity(v) => line.quantity = v,
            LineEdit::UnitPrice(v) => line.unit_price = v,
            LineEdit::CatalogRef(v) => line.catalog_ref = v,
        }
        Ok(())
    }

    /// Copies a catalog entry's id, title, size, brand and sale price onto
    /// an existing line. Quantity is left alone and stock is not checked.
    pub fn select_catalog_entry(&mut self, row_id: Uuid, carpet: &Carpet) -> CoreResult<()> {
        self.ensure_editable()?;
        let index = self.line_index(row_id)?;
        self.lines[index].apply_carpet(carpet);
        Ok(())
    }

    /// Appends a check and returns its row id.
    pub fn add_check(&mut self, check: CheckDraft) -> CoreResult<Uuid> {
        self.ensure_editable()?;
        validate_amount("amount", check.amount)?;
        let row_id = check.row_id;
        self.checks.push(check);
        Ok(row_id)
    }

    pub fn remove_check(&mut self, row_id: Uuid) -> CoreResult<CheckDraft> {
        self.ensure_editable()?;
        let index = self.check_index(row_id)?;
        Ok(self.checks.remove(index))
    }

    pub fn edit_check(&mut self, row_id: Uuid, edit: CheckEdit) -> CoreResult<()> {
        self.ensure_editable()?;
        if let CheckEdit::Amount(amount) = &edit {
            validate_amount("amount", *amount)?;
        }
        let index = self.check_index(row_id)?;
        let check = &mut self.checks[index];
        match edit {
            CheckEdit::Number(v) => check.check_number = v,
            CheckEdit::Amount(v) => check.amount = v,
            CheckEdit::Payee(v) => check.payee = v,
            CheckEdit::DueDate(v) => check.due_date = v,
        }
        Ok(())
    }

    fn line_index(&self, row_id: Uuid) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.row_id == row_id)
            .ok_or_else(|| CoreError::LineNotFound(row_id.to_string()))
    }

    fn check_index(&self, row_id: Uuid) -> CoreResult<usize> {
        self.checks
            .iter()
            .position(|c| c.row_id == row_id)
            .ok_or_else(|| CoreError::CheckNotFound(row_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // State transitions
    // -------------------------------------------------------------------------

    /// Local preconditions for Save Draft and Finalize.
    ///
    /// ## Order
    /// 1. Not already finalized
    /// 2. Customer name present
    /// 3. At least one line item
    /// 4. Cash and checks admitted by the payment method
    pub fn validate_for_submit(&self) -> CoreResult<()> {
        self.ensure_editable()?;
        validate_customer_name(&self.customer_name)?;
        if self.lines.is_empty() {
            return Err(ValidationError::Empty {
                field: "line item".to_string(),
            }
            .into());
        }
        if self.cash_amount.is_positive() && !self.payment_method.admits_cash() {
            return Err(ValidationError::NotAdmitted {
                field: "cash_amount".to_string(),
                method: self.payment_method.alias().to_string(),
            }
            .into());
        }
        if !self.checks.is_empty() && !self.payment_method.admits_checks() {
            return Err(ValidationError::NotAdmitted {
                field: "checks".to_string(),
                method: self.payment_method.alias().to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Records the backend id after a successful create or update.
    pub fn mark_saved(&mut self, server_id: i64) -> CoreResult<()> {
        self.ensure_editable()?;
        self.server_id = Some(server_id);
        Ok(())
    }

    /// The one-way transition to `Finalized`. Requires a persisted record.
    pub fn mark_finalized(&mut self) -> CoreResult<()> {
        self.ensure_editable()?;
        if self.server_id.is_none() {
            return Err(ValidationError::Required {
                field: "server_id".to_string(),
            }
            .into());
        }
        self.finalized = true;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
