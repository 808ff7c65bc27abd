use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::domain::{coupon::Coupon, product::Product, shipping::ShippingOption};
use crate::forms::catalog::UploadCatalogForm;
use crate::repository::{CatalogReader, ReferenceDataReader, RepositoryError, RepositoryResult};

const PRODUCTS_JSON: &str = "products.json";
const PRODUCTS_CSV: &str = "products.csv";
const COUPONS_JSON: &str = "coupons.json";
const SHIPPING_JSON: &str = "shipping.json";

/// Catalog and reference data read from static files in one directory.
///
/// Products come from `products.json`, or from `products.csv` when no JSON
/// file exists. Coupons and shipping options are optional; a missing file
/// yields an empty list.
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    root: PathBuf,
}

impl JsonDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_optional_list<T: DeserializeOwned>(&self, file_name: &str) -> RepositoryResult<Vec<T>> {
        let path = self.root.join(file_name);
        if !path.exists() {
            log::debug!("{} not found, using an empty list", path.display());
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl CatalogReader for JsonDataSource {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let json_path = self.root.join(PRODUCTS_JSON);
        if json_path.exists() {
            let bytes = fs::read(&json_path)?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let csv_path = self.root.join(PRODUCTS_CSV);
        if csv_path.exists() {
            let bytes = fs::read(&csv_path)?;
            return UploadCatalogForm::new(bytes)
                .into_products()
                .map_err(|err| RepositoryError::Import(err.to_string()));
        }

        log::error!("No catalog file found in {}", self.root.display());
        Err(RepositoryError::NotFound)
    }
}

impl ReferenceDataReader for JsonDataSource {
    fn list_coupons(&self) -> RepositoryResult<Vec<Coupon>> {
        self.read_optional_list(COUPONS_JSON)
    }

    fn list_shipping_options(&self) -> RepositoryResult<Vec<ShippingOption>> {
        self.read_optional_list(SHIPPING_JSON)
    }
}

/// Catalog and reference data held in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub products: Vec<Product>,
    pub coupons: Vec<Coupon>,
    pub shipping_options: Vec<ShippingOption>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn with_coupons(mut self, coupons: Vec<Coupon>) -> Self {
        self.coupons = coupons;
        self
    }

    pub fn with_shipping_options(mut self, shipping_options: Vec<ShippingOption>) -> Self {
        self.shipping_options = shipping_options;
        self
    }
}

impl CatalogReader for StaticCatalog {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        Ok(self.products.clone())
    }
}

impl ReferenceDataReader for StaticCatalog {
    fn list_coupons(&self) -> RepositoryResult<Vec<Coupon>> {
        Ok(self.coupons.clone())
    }

    fn list_shipping_options(&self) -> RepositoryResult<Vec<ShippingOption>> {
        Ok(self.shipping_options.clone())
    }
}
