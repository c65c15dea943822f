//! # farsh-client: Backend Client for Farsh
//!
//! Every network call the shop makes goes through this crate: session
//! handling, the typed REST client, one service per view, and the Save
//! Draft / Finalize workflow.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Architecture                              │
//! │                                                                         │
//! │  ┌──────────────┐      ┌──────────────────────────────────────────┐    │
//! │  │ ClientConfig │─────►│ ApiClient                                │    │
//! │  │ TOML + env   │      │ base_url, shared reqwest::Client         │    │
//! │  └──────────────┘      │ Authorization: Bearer <session token>    │    │
//! │  ┌──────────────┐      └───────────────────┬──────────────────────┘    │
//! │  │ SessionStore │── SessionHandle ─────────┘                           │
//! │  │ session.json │                          │                           │
//! │  └──────────────┘        ┌─────────────────┼──────────────────┐        │
//! │                          ▼                 ▼                  ▼        │
//! │                  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │
//! │                  │ Catalog /    │  │ Invoice      │  │ Report /     │  │
//! │                  │ Check        │  │ Service      │  │ User         │  │
//! │                  │ Services     │  │ (Backend)    │  │ Services     │  │
//! │                  └──────┬───────┘  └──────┬───────┘  └──────────────┘  │
//! │                         │                 │                            │
//! │                         ▼                 ▼                            │
//! │                  ┌──────────────┐  ┌──────────────┐                    │
//! │                  │ CatalogView  │  │ Invoice      │                    │
//! │                  │ LatestRequest│  │ Workflow     │                    │
//! │                  └──────────────┘  └──────────────┘                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - HTTP gateway and error-body decoding
//! - [`config`] - Layered configuration
//! - [`error`] - Client error types and user-facing fallbacks
//! - [`guard`] - Stale-response guard for views
//! - [`services`] - One service per backend resource
//! - [`session`] - Token and user persistence
//! - [`wire`] - Request payloads and list filters
//! - [`workflow`] - Save Draft and the Finalize saga
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farsh_client::{ApiClient, ClientConfig, InvoiceService, InvoiceWorkflow, SessionStore};
//!
//! let config = ClientConfig::load(None)?;
//! let store = SessionStore::hydrate(config.session_path()?)?;
//! let api = ApiClient::from_config(&config, store.handle())?;
//!
//! let workflow = InvoiceWorkflow::new(InvoiceService::new(api));
//! let report = workflow.finalize(&mut draft).await?;
//! for failure in &report.check_failures {
//!     eprintln!("check {} was not registered: {}", failure.check_number, failure.message);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod services;
pub mod session;
pub mod wire;
pub mod workflow;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use guard::{CatalogView, LatestRequest, Ticket};
pub use services::{CatalogService, CheckService, InvoiceService, ReportService, UserService};
pub use session::{Session, SessionHandle, SessionStore};
pub use workflow::{
    CheckFailure, FinalizeReport, FinalizeStep, InvoiceBackend, InvoiceWorkflow, SaveOutcome,
    StepStatus,
};
