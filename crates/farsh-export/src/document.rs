//! # Invoice Document
//!
//! The renderer-neutral content of an exported invoice. Both the PDF and
//! the spreadsheet are drawn from this one model, and every figure in it
//! comes from [`InvoiceDraft::totals`], so exports match the screen.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shop name                                      │
//! │                      address · Tel: phone                               │
//! │ ─────────────────────────────────────────────────────────────────────── │
//! │ Customer: ...                                   Date: 1403/01/01        │
//! │                                                                         │
//! │  # │ Title │ Size │ Brand │ Qty │ Price │ Total                         │
//! │  1 │ ...                                                                │
//! │                                     Subtotal / Discount / Payable       │
//! │ Cash / Checks / Remaining                                               │
//! │ Checks: 1. No ... | Amount ... | Date ...                               │
//! │ Notes                                                                   │
//! │                                                                         │
//! │   Seller signature:                      Buyer signature:               │
//! │   __________________                     __________________             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use farsh_core::{format_jalali, InvoiceDraft, InvoiceTotals, Money};

/// Shop letterhead printed at the top of every export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopHeader {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Appended to money figures, e.g. "Toman".
    pub currency_label: String,
}

impl Default for ShopHeader {
    fn default() -> Self {
        ShopHeader {
            name: "Carpet Shop".to_string(),
            address: String::new(),
            phone: String::new(),
            currency_label: "Toman".to_string(),
        }
    }
}

/// Captions above the two blank signature lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureTitles {
    pub seller: String,
    pub buyer: String,
}

impl Default for SignatureTitles {
    fn default() -> Self {
        SignatureTitles {
            seller: "Seller signature:".to_string(),
            buyer: "Buyer signature:".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLine {
    /// 1-based row number.
    pub index: usize,
    pub title: String,
    pub size: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCheck {
    pub index: usize,
    pub number: String,
    pub amount: Money,
    pub payee: String,
    /// Jalali due date.
    pub due_date: String,
}

/// Everything an export shows, already formatted where formatting is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub shop: ShopHeader,
    pub customer_name: String,
    /// Jalali invoice date.
    pub date: String,
    pub payment_method: String,
    pub lines: Vec<DocumentLine>,
    pub totals: InvoiceTotals,
    pub checks: Vec<DocumentCheck>,
    pub notes: Option<String>,
    pub signatures: SignatureTitles,
}

impl InvoiceDocument {
    /// Builds the document for the draft's current state.
    ///
    /// Every entered check is listed, so the listing always adds up to
    /// `totals.checks_total`.
    pub fn build(draft: &InvoiceDraft, shop: &ShopHeader, signatures: &SignatureTitles) -> Self {
        let lines = draft
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| DocumentLine {
                index: i + 1,
                title: placeholder(&line.title),
                size: placeholder(&line.size),
                brand: placeholder(&line.brand),
                quantity: line.quantity,
                unit_price: line.unit_price,
                total: line.line_total(),
            })
            .collect();

        let checks = draft
            .checks()
            .iter()
            .enumerate()
            .map(|(i, check)| DocumentCheck {
                index: i + 1,
                number: check.check_number.clone(),
                amount: check.amount,
                payee: draft.payee_for(check).to_string(),
                due_date: format_jalali(check.due_date),
            })
            .collect();

        let notes = draft.notes().trim();

        InvoiceDocument {
            shop: shop.clone(),
            customer_name: draft.customer_name().trim().to_string(),
            date: format_jalali(draft.invoice_date()),
            payment_method: draft.payment_method().to_string(),
            lines,
            totals: draft.totals(),
            checks,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            signatures: signatures.clone(),
        }
    }

    /// `200,000 Toman`
    pub fn money(&self, amount: Money) -> String {
        if self.shop.currency_label.is_empty() {
            amount.to_string()
        } else {
            format!("{} {}", amount, self.shop.currency_label)
        }
    }
}

fn placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
