//! Product validation port.
//!
//! Order creation checks every SKU against the product catalog before an
//! aggregate is constructed, so an order referencing unknown or inactive
//! products is never persisted.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use domain::SkuId;
use thiserror::Error;

/// Errors from product validation.
#[derive(Debug, Error)]
pub enum ProductValidationError {
    /// The SKU does not exist in the catalog.
    #[error("unknown SKU {0}")]
    UnknownSku(String),

    /// The SKU exists but is not currently orderable.
    #[error("SKU {0} is not available")]
    Unavailable(String),

    /// The catalog could not be reached.
    #[error("product catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

/// Port for validating that SKUs are known and orderable.
#[async_trait]
pub trait ProductValidator: Send + Sync {
    /// Validates every SKU; fails on the first invalid one.
    async fn validate_skus(&self, skus: &[SkuId]) -> Result<(), ProductValidationError>;
}

/// In-memory product catalog for testing and local development.
#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<String, bool>>,
    should_fail: RwLock<bool>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a SKU as known and active.
    pub fn register_sku(&self, sku: impl Into<String>) {
        if let Ok(mut products) = self.products.write() {
            products.insert(sku.into(), true);
        }
    }

    /// Marks a known SKU as inactive.
    pub fn deactivate_sku(&self, sku: &str) {
        if let Ok(mut products) = self.products.write() {
            products.insert(sku.to_string(), false);
        }
    }

    /// Makes every validation fail as if the catalog were unreachable.
    pub fn set_should_fail(&self, fail: bool) {
        if let Ok(mut should_fail) = self.should_fail.write() {
            *should_fail = fail;
        }
    }
}

#[async_trait]
impl ProductValidator for InMemoryProductCatalog {
    async fn validate_skus(&self, skus: &[SkuId]) -> Result<(), ProductValidationError> {
        let should_fail = self.should_fail.read().map(|f| *f).unwrap_or(true);
        if should_fail {
            return Err(ProductValidationError::CatalogUnavailable(
                "simulated catalog failure".to_string(),
            ));
        }

        let products = self.products.read().map_err(|_| {
            ProductValidationError::CatalogUnavailable("catalog lock poisoned".to_string())
        })?;

        for sku in skus {
            match products.get(sku.as_str()) {
                None => return Err(ProductValidationError::UnknownSku(sku.to_string())),
                Some(false) => return Err(ProductValidationError::Unavailable(sku.to_string())),
                Some(true) => {}
            }
        }
        Ok(())
    }
}
