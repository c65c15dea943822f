//! # Services
//!
//! One service per screen of the shop, each a thin typed layer over
//! [`ApiClient`](crate::api::ApiClient).
//!
//! ```text
//!   CatalogService  ── carpets/, carpets/{id}, carpets/export/pdf, operations
//!   InvoiceService  ── invoices/, invoices/{id}, invoices/{id}/finalize
//!   CheckService    ── checks/, checks/{id}, checks/upcoming
//!   ReportService   ── reports/financial/{period}, reports/inventory
//!   UserService     ── users/, auth/register, auth/me
//! ```
//!
//! Services validate what they can before sending; the backend validates
//! the rest and its `detail` is passed through untouched.

pub mod catalog;
pub mod checks;
pub mod invoices;
pub mod reports;
pub mod users;

pub use catalog::CatalogService;
pub use checks::CheckService;
pub use invoices::InvoiceService;
pub use reports::ReportService;
pub use users::UserService;
