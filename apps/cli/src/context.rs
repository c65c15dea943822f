//! # Command Context
//!
//! What every subcommand needs: the loaded config, the hydrated session and
//! one shared [`ApiClient`]. Built once in `run`, then borrowed.

use std::path::PathBuf;

use farsh_client::{
    ApiClient, CatalogService, CheckService, ClientConfig, InvoiceService, InvoiceWorkflow,
    ReportService, SessionStore, UserService,
};
use farsh_export::{ShopHeader, SignatureTitles};
use tracing::debug;

use crate::error::CliResult;

pub struct AppContext {
    pub config: ClientConfig,
    pub session: SessionStore,
    pub api: ApiClient,
    /// Print JSON instead of tables.
    pub json: bool,
}

impl AppContext {
    /// Loads config, hydrates the session file and wires the API client to it.
    pub fn load(config_path: Option<PathBuf>, json: bool) -> CliResult<Self> {
        let config = ClientConfig::load(config_path)?;
        let session = SessionStore::hydrate(config.session_path()?)?;
        let api = ApiClient::from_config(&config, session.handle())?;
        debug!(base_url = %api.base_url(), session = ?session.path(), "Context ready");
        Ok(AppContext {
            config,
            session,
            api,
            json,
        })
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.api.clone())
    }

    pub fn invoices(&self) -> InvoiceService {
        InvoiceService::new(self.api.clone())
    }

    pub fn checks(&self) -> CheckService {
        CheckService::new(self.api.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.api.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.api.clone())
    }

    pub fn workflow(&self) -> InvoiceWorkflow<InvoiceService> {
        InvoiceWorkflow::new(self.invoices())
    }

    pub fn shop_header(&self) -> ShopHeader {
        ShopHeader {
            name: self.config.shop.name.clone(),
            address: self.config.shop.address.clone(),
            phone: self.config.shop.phone.clone(),
            currency_label: self.config.export.currency_label.clone(),
        }
    }

    pub fn signature_titles(&self) -> SignatureTitles {
        SignatureTitles {
            seller: self.config.export.seller_signature_title.clone(),
            buyer: self.config.export.buyer_signature_title.clone(),
        }
    }
}
