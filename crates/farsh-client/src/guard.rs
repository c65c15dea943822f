//! # Stale Response Guard
//!
//! In-flight requests are never cancelled. A response that arrives after a
//! newer request was issued, or after the view went away, is dropped instead
//! of being applied.
//!
//! ```text
//!   refresh("a") ── ticket 1 ───────────────────────► response 1  (dropped)
//!   refresh("ab") ─── ticket 2 ──────► response 2                 (applied)
//!   invalidate() ──► every outstanding ticket is stale
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use farsh_core::Carpet;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ClientResult;
use crate::services::CatalogService;
use crate::wire::CarpetFilter;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out tickets; only the most recent one is current.
#[derive(Debug, Clone, Default)]
pub struct LatestRequest {
    generation: Arc<AtomicU64>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket, making every earlier ticket stale.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks all outstanding tickets stale (the view was closed).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Catalog View
// =============================================================================

/// The catalog entries a view shows, refreshed through the guard.
#[derive(Debug, Clone)]
pub struct CatalogView {
    service: CatalogService,
    guard: LatestRequest,
    entries: Arc<RwLock<Vec<Carpet>>>,
}

impl CatalogView {
    pub fn new(service: CatalogService) -> Self {
        CatalogView {
            service,
            guard: LatestRequest::new(),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fetches with `filter` and applies the result if no newer refresh was
    /// started meanwhile. Returns whether it was applied.
    pub async fn refresh(&self, filter: &CarpetFilter) -> ClientResult<bool> {
        let ticket = self.guard.ticket();
        let carpets = self.service.list(filter).await?;
        Ok(self.apply(ticket, carpets).await)
    }

    /// The ticket is tested under the write lock, so a refresh issued while
    /// this one waits for the lock always wins.
    async fn apply(&self, ticket: Ticket, carpets: Vec<Carpet>) -> bool {
        let mut entries = self.entries.write().await;
        if !self.guard.is_current(ticket) {
            debug!(?ticket, "Discarding stale catalog response");
            return false;
        }
        *entries = carpets;
        true
    }

    pub async fn entries(&self) -> Vec<Carpet> {
        self.entries.read().await.clone()
    }

    /// Looks up a loaded entry, for attaching it to an invoice line.
    pub async fn find(&self, id: i64) -> Option<Carpet> {
        self.entries.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub fn close(&self) {
        self.guard.invalidate();
    }
}
