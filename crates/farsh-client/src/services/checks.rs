//! # Check Service
//!
//! Checks are managed independently of invoices; the link is only the
//! `invoice_id` foreign key.
//!
//! Status changes are plain partial updates. No transition graph is checked
//! here: any status may follow any other, and the backend decides.

use farsh_core::validation::{
    validate_amount, validate_check_number, validate_date_range, validate_page_limit,
    validate_payee, validate_upcoming_days,
};
use farsh_core::{CheckRecord, CheckStatus, MAX_PAGE_LIMIT};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::wire::{CheckFilter, CheckUpdate, NewCheck};

#[derive(Debug, Clone)]
pub struct CheckService {
    api: ApiClient,
}

impl CheckService {
    pub fn new(api: ApiClient) -> Self {
        CheckService { api }
    }

    pub async fn create(&self, check: &NewCheck) -> ClientResult<CheckRecord> {
        validate_check_number(&check.check_number)?;
        validate_payee(&check.payee)?;
        validate_amount("amount", check.amount)?;
        let created: CheckRecord = self.api.post("checks/", check).await?;
        info!(check_id = created.id, number = %created.check_number, "Check created");
        Ok(created)
    }

    /// Lists checks matching `filter`.
    ///
    /// The backend ignores `invoice_id`, so with that filter set every page
    /// is fetched, the matches are kept, and `skip`/`limit` are applied to
    /// the matches. Without a `limit` all matches are returned.
    pub async fn list(&self, filter: &CheckFilter) -> ClientResult<Vec<CheckRecord>> {
        if let Some(limit) = filter.limit {
            validate_page_limit(limit)?;
        }
        validate_date_range(filter.start_date, filter.end_date)?;

        let Some(invoice_id) = filter.invoice_id else {
            let checks: Vec<CheckRecord> = self.api.get("checks/", &filter.to_query()).await?;
            debug!(count = checks.len(), "Checks listed");
            return Ok(checks);
        };

        let mut page = CheckFilter {
            invoice_id: None,
            skip: Some(0),
            limit: Some(MAX_PAGE_LIMIT),
            ..filter.clone()
        };
        let mut matches = Vec::new();
        let mut pages = 0;
        loop {
            let batch: Vec<CheckRecord> = self.api.get("checks/", &page.to_query()).await?;
            pages += 1;
            let fetched = batch.len();
            matches.extend(batch.into_iter().filter(|c| c.invoice_id == Some(invoice_id)));
            if fetched < MAX_PAGE_LIMIT as usize {
                break;
            }
            page.skip = Some(page.skip.unwrap_or(0) + MAX_PAGE_LIMIT);
        }

        let skip = filter.skip.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        let checks: Vec<CheckRecord> = matches.into_iter().skip(skip).take(limit).collect();
        debug!(invoice_id, pages, count = checks.len(), "Checks listed for invoice");
        Ok(checks)
    }

    /// Every check registered against one invoice.
    pub async fn list_for_invoice(&self, invoice_id: i64) -> ClientResult<Vec<CheckRecord>> {
        self.list(&CheckFilter {
            invoice_id: Some(invoice_id),
            ..Default::default()
        })
        .await
    }

    /// Checks due within the next `days` days (1-90).
    pub async fn upcoming(&self, days: u32) -> ClientResult<Vec<CheckRecord>> {
        validate_upcoming_days(days)?;
        self.api
            .get("checks/upcoming", &vec![("days", days.to_string())])
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<CheckRecord> {
        self.api.get(&format!("checks/{}", id), &Vec::new()).await
    }

    pub async fn update(&self, id: i64, update: &CheckUpdate) -> ClientResult<CheckRecord> {
        if let Some(amount) = update.amount {
            validate_amount("amount", amount)?;
        }
        if let Some(number) = &update.check_number {
            validate_check_number(number)?;
        }
        self.api.put(&format!("checks/{}", id), update).await
    }

    /// Moves a check to `status`, whatever its current status.
    pub async fn set_status(&self, id: i64, status: CheckStatus) -> ClientResult<CheckRecord> {
        let updated = self.update(id, &CheckUpdate::status(status)).await?;
        info!(check_id = id, status = %status, "Check status changed");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("checks/{}", id)).await?;
        info!(check_id = id, "Check deleted");
        Ok(())
    }
}
