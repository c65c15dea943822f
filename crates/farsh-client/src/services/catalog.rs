//! # Catalog Service
//!
//! Carpet inventory: filtered listing, detail, mutation, server-side PDF
//! export and post-purchase operations (wash, repair).

use farsh_core::validation::{
    validate_amount, validate_operation_name, validate_page_limit, validate_search_query,
};
use farsh_core::{Carpet, CarpetDetail, CarpetOperation, ValidationError, MAX_NAME_LEN};
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::wire::{CarpetFilter, CarpetUpdate, NewCarpet, NewOperation};

#[derive(Debug, Clone)]
pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    pub fn new(api: ApiClient) -> Self {
        CatalogService { api }
    }

    /// Lists carpets matching `filter`.
    pub async fn list(&self, filter: &CarpetFilter) -> ClientResult<Vec<Carpet>> {
        let filter = normalized(filter)?;
        let carpets: Vec<Carpet> = self.api.get("carpets/", &filter.to_query()).await?;
        debug!(count = carpets.len(), "Carpets listed");
        Ok(carpets)
    }

    pub async fn get(&self, id: i64) -> ClientResult<CarpetDetail> {
        self.api.get(&format!("carpets/{}", id), &Vec::new()).await
    }

    pub async fn create(&self, carpet: &NewCarpet) -> ClientResult<CarpetDetail> {
        validate_new_carpet(carpet)?;
        let created: CarpetDetail = self.api.post("carpets/", carpet).await?;
        info!(carpet_id = created.id, pattern = %created.pattern, "Carpet created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, update: &CarpetUpdate) -> ClientResult<CarpetDetail> {
        if update.is_empty() {
            return Err(ValidationError::Required {
                field: "at least one field to update".to_string(),
            }
            .into());
        }
        if let Some(price) = update.sale_price {
            validate_amount("sale_price", price)?;
        }
        if let Some(price) = update.purchase_price {
            validate_amount("purchase_price", price)?;
        }
        let updated: CarpetDetail = self.api.put(&format!("carpets/{}", id), update).await?;
        info!(carpet_id = id, "Carpet updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("carpets/{}", id)).await?;
        info!(carpet_id = id, "Carpet deleted");
        Ok(())
    }

    /// The backend's PDF rendering of the filtered inventory.
    pub async fn export_pdf(&self, filter: &CarpetFilter) -> ClientResult<Vec<u8>> {
        let filter = normalized(filter)?;
        let bytes = self
            .api
            .get_bytes("carpets/export/pdf", &filter.filter_query())
            .await?;
        info!(bytes = bytes.len(), "Inventory PDF exported");
        Ok(bytes)
    }

    pub async fn add_operation(
        &self,
        carpet_id: i64,
        operation: &NewOperation,
    ) -> ClientResult<CarpetOperation> {
        validate_operation(operation)?;
        let created: CarpetOperation = self
            .api
            .post(&format!("carpets/{}/operations", carpet_id), operation)
            .await?;
        info!(carpet_id, operation_id = created.id, "Carpet operation added");
        Ok(created)
    }

    pub async fn update_operation(
        &self,
        operation_id: i64,
        operation: &NewOperation,
    ) -> ClientResult<CarpetOperation> {
        validate_operation(operation)?;
        self.api
            .put(&format!("carpets/operations/{}", operation_id), operation)
            .await
    }

    pub async fn delete_operation(&self, operation_id: i64) -> ClientResult<()> {
        self.api
            .delete(&format!("carpets/operations/{}", operation_id))
            .await?;
        info!(operation_id, "Carpet operation deleted");
        Ok(())
    }
}

fn normalized(filter: &CarpetFilter) -> ClientResult<CarpetFilter> {
    let mut filter = filter.clone();
    if let Some(limit) = filter.limit {
        validate_page_limit(limit)?;
    }
    if let Some(search) = filter.search.take() {
        let search = validate_search_query(&search)?;
        filter.search = (!search.is_empty()).then_some(search);
    }
    Ok(filter)
}

fn validate_new_carpet(carpet: &NewCarpet) -> ClientResult<()> {
    for (field, value) in [
        ("pattern", &carpet.pattern),
        ("brand", &carpet.brand),
        ("material", &carpet.material),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            }
            .into());
        }
        if value.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_NAME_LEN,
            }
            .into());
        }
    }
    validate_amount("purchase_price", carpet.purchase_price)?;
    if let Some(price) = carpet.sale_price {
        validate_amount("sale_price", price)?;
    }
    if carpet.is_consignment && carpet.consignment_owner.as_deref().map_or(true, str::is_empty) {
        return Err(ValidationError::Required {
            field: "consignment_owner".to_string(),
        }
        .into());
    }
    Ok(())
}

fn validate_operation(operation: &NewOperation) -> ClientResult<()> {
    validate_operation_name(&operation.operation_name)?;
    validate_amount("price", operation.price)?;
    Ok(())
}
