//! # Invoice Service
//!
//! Persisted invoices. The draft/finalize sequencing lives in
//! [`InvoiceWorkflow`](crate::workflow::InvoiceWorkflow); this service is the
//! backend it runs against.

use async_trait::async_trait;
use farsh_core::validation::{validate_date_range, validate_page_limit};
use farsh_core::{CheckRecord, InvoiceRecord, InvoiceSummary};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::wire::{InvoiceFilter, InvoicePayload, NewCheck};
use crate::workflow::InvoiceBackend;

#[derive(Debug, Clone)]
pub struct InvoiceService {
    api: ApiClient,
}

impl InvoiceService {
    pub fn new(api: ApiClient) -> Self {
        InvoiceService { api }
    }

    pub async fn list(&self, filter: &InvoiceFilter) -> ClientResult<Vec<InvoiceSummary>> {
        if let Some(limit) = filter.limit {
            validate_page_limit(limit)?;
        }
        validate_date_range(filter.start_date, filter.end_date)?;
        let invoices: Vec<InvoiceSummary> = self.api.get("invoices/", &filter.to_query()).await?;
        debug!(count = invoices.len(), "Invoices listed");
        Ok(invoices)
    }

    pub async fn get(&self, id: i64) -> ClientResult<InvoiceRecord> {
        self.api.get(&format!("invoices/{}", id), &Vec::new()).await
    }

    pub async fn create(&self, payload: &InvoicePayload) -> ClientResult<InvoiceRecord> {
        let record: InvoiceRecord = self.api.post("invoices/", payload).await?;
        info!(invoice_id = record.id, number = %record.invoice_number, "Invoice created");
        Ok(record)
    }

    pub async fn update(&self, id: i64, payload: &InvoicePayload) -> ClientResult<InvoiceRecord> {
        let record: InvoiceRecord = self.api.put(&format!("invoices/{}", id), payload).await?;
        info!(invoice_id = id, "Invoice updated");
        Ok(record)
    }

    /// Commits the invoice and decrements stock on the backend.
    pub async fn finalize(&self, id: i64) -> ClientResult<InvoiceRecord> {
        let record: InvoiceRecord = self
            .api
            .post_empty(&format!("invoices/{}/finalize", id))
            .await?;
        info!(invoice_id = id, "Invoice finalized");
        Ok(record)
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("invoices/{}", id)).await?;
        info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }
}

#[async_trait]
impl InvoiceBackend for InvoiceService {
    async fn create_invoice(&self, payload: &InvoicePayload) -> ClientResult<i64> {
        Ok(self.create(payload).await?.id)
    }

    async fn update_invoice(&self, id: i64, payload: &InvoicePayload) -> ClientResult<()> {
        self.update(id, payload).await.map(|_| ())
    }

    async fn finalize_invoice(&self, id: i64) -> ClientResult<()> {
        self.finalize(id).await.map(|_| ())
    }

    async fn create_check(&self, check: &NewCheck) -> ClientResult<CheckRecord> {
        self.api.post("checks/", check).await
    }
}
