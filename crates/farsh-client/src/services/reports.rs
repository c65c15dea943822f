//! # Report Service
//!
//! Read-only, pre-aggregated figures. Nothing is computed client-side.

use farsh_core::validation::validate_date_range;
use farsh_core::{FinancialReport, InventoryReport, ReportPeriod};
use tracing::debug;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::wire::PeriodRequest;

#[derive(Debug, Clone)]
pub struct ReportService {
    api: ApiClient,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        ReportService { api }
    }

    /// Financial report for one of the backend's fixed look-back windows.
    pub async fn financial(&self, period: ReportPeriod) -> ClientResult<FinancialReport> {
        debug!(period = %period, "Fetching financial report");
        self.api
            .get(&format!("reports/financial/{}", period.as_wire()), &Vec::new())
            .await
    }

    /// Financial report for an arbitrary date range.
    pub async fn financial_range(&self, range: &PeriodRequest) -> ClientResult<FinancialReport> {
        validate_date_range(range.start_date, range.end_date)?;
        self.api.post("reports/financial", range).await
    }

    pub async fn inventory(&self) -> ClientResult<InventoryReport> {
        self.api.get("reports/inventory", &Vec::new()).await
    }
}
