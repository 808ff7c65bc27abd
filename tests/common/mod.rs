//! Helpers for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use storefront_engine::domain::coupon::{Coupon, DiscountType};
use storefront_engine::domain::product::Product;
use storefront_engine::domain::shipping::ShippingOption;
use storefront_engine::domain::user::AuthenticatedUser;
use storefront_engine::forms::checkout::ShippingAddressForm;
use storefront_engine::repository::StaticCatalog;
use tempfile::TempDir;

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(1, "Café de grano", 10000, 3)
            .with_category("Bebidas")
            .with_rating(4.7)
            .with_image("https://img.example/cafe.jpg"),
        Product::new(2, "Té verde", 2500, 10)
            .with_category("Bebidas")
            .with_rating(4.2),
        Product::new(3, "Mermelada", 3200, 5)
            .with_category("Despensa")
            .with_rating(3.8),
    ]
}

pub fn sample_coupons() -> Vec<Coupon> {
    vec![
        Coupon::new("SAVE5000", DiscountType::Fixed, 5000)
            .with_description("5000 off over 15000")
            .with_minimum_subtotal(15000),
    ]
}

pub fn sample_shipping() -> Vec<ShippingOption> {
    vec![
        ShippingOption::delivery(1, "Despacho a domicilio", 2000).with_transit("1-2 días hábiles"),
        ShippingOption::pickup(2, "Retiro en tienda", 0),
    ]
}

pub fn sample_source() -> StaticCatalog {
    StaticCatalog::new(sample_products())
        .with_coupons(sample_coupons())
        .with_shipping_options(sample_shipping())
}

pub fn buyer() -> AuthenticatedUser {
    AuthenticatedUser::new("user-1", "Ana Pérez", "ana@example.com")
        .with_rut("12.345.678-5")
        .with_phone("+56 9 1234 5678")
}

pub fn address() -> ShippingAddressForm {
    ShippingAddressForm {
        street: "Av. Providencia 1234".to_string(),
        postal_code: "7500000".to_string(),
        commune: "Providencia".to_string(),
        city: "Santiago".to_string(),
    }
}

/// Temporary data directory populated with JSON reference files.
pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir.");
        TestDataDir { dir }
    }

    pub fn with_json<T: serde::Serialize>(self, file_name: &str, value: &T) -> Self {
        let bytes = serde_json::to_vec_pretty(value).expect("serialize fixture");
        fs::write(self.dir.path().join(file_name), bytes).expect("write fixture");
        self
    }

    pub fn with_file(self, file_name: &str, contents: &str) -> Self {
        fs::write(self.dir.path().join(file_name), contents).expect("write fixture");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
