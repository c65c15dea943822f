//! # farsh-core: Pure Business Logic for Farsh
//!
//! This crate is the **heart** of the Farsh carpet shop client. It contains
//! the invoice draft engine and every derived figure as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Farsh Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    farsh CLI (apps/cli)                         │   │
//! │  │   login ──► carpets ──► invoice create ──► checks ──► reports  │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐    ┌──────────────▼──────────────┐    │
//! │  │        farsh-client         │    │        farsh-export         │    │
//! │  │  REST, session, finalize    │    │     PDF / spreadsheet       │    │
//! │  └──────────────┬──────────────┘    └──────────────┬──────────────┘    │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────────▼──────────────┐    │
//! │  │               ★ farsh-core (THIS CRATE) ★                      │    │
//! │  │                                                                │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │    │
//! │  │   │   types   │  │   money   │  │   draft   │  │ validation│  │    │
//! │  │   │  Carpet   │  │   Money   │  │  Invoice  │  │   rules   │  │    │
//! │  │   │  Check    │  │ (Toman)   │  │  Totals   │  │  limits   │  │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │    │
//! │  │                                                                │    │
//! │  │   NO I/O • NO NETWORK • NO FILES • PURE FUNCTIONS              │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Backend enums and records (Carpet, InvoiceRecord, CheckRecord, ...)
//! - [`money`] - Integer Toman amounts
//! - [`draft`] - The invoice draft, its totals and its state machine
//! - [`validation`] - Field rules checked before any request is sent
//! - [`jalali`] - Solar Hijri date display
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use farsh_core::{InvoiceDraft, LineItem, Money, PaymentMethod};
//!
//! let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
//! draft.set_customer_name("Sara").unwrap();
//! draft.add_line(LineItem::freeform("Tabriz 6m", 2, Money::from_units(100_000))).unwrap();
//! draft.set_payment_method(PaymentMethod::Cash).unwrap();
//! draft.set_cash_amount(Money::from_units(150_000)).unwrap();
//!
//! let totals = draft.totals();
//! assert_eq!(totals.total.to_string(), "200,000");
//! assert_eq!(totals.remaining_to_pay.to_string(), "50,000");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod jalali;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use farsh_core::Money` instead of
// `use farsh_core::money::Money`

pub use draft::{
    CheckDraft, CheckEdit, DraftState, InvoiceDraft, InvoiceTotals, LineEdit, LineItem,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use jalali::{format_jalali, JalaliDate};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest customer, payee, title or operation name the backend stores.
pub const MAX_NAME_LEN: usize = 200;

/// Largest single amount accepted from input: one quadrillion Toman.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Longest check number the backend stores.
pub const MAX_CHECK_NUMBER_LEN: usize = 100;

/// Username length bounds for new accounts.
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 100;

/// Shortest password the backend accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest free-text catalog search.
pub const MAX_SEARCH_LEN: usize = 100;

/// Page size bounds for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Upcoming-checks window bounds, in days.
pub const DEFAULT_UPCOMING_DAYS: u32 = 7;
pub const MAX_UPCOMING_DAYS: u32 = 90;

/// Pause between a successful Finalize and returning to the invoice list,
/// so the success notice stays visible.
pub const FINALIZE_REDIRECT_DELAY_MS: u64 = 1500;
