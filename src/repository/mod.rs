use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    coupon::Coupon,
    order::{NewOrder, NewOrderLine, Order, OrderLine},
    product::Product,
    shipping::ShippingOption,
};

pub mod catalog;
pub mod errors;
pub mod order;
pub mod snapshot;

#[cfg(test)]
pub mod mock;

pub use catalog::{JsonDataSource, StaticCatalog};
pub use errors::{RepositoryError, RepositoryResult};
pub use order::InMemoryOrderBackend;
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore};

/// Snapshot key holding the serialized cart lines.
pub const CART_SNAPSHOT_KEY: &str = "cart";
/// Snapshot key holding the serialized favorites.
pub const FAVORITES_SNAPSHOT_KEY: &str = "favorites";

/// Read-only access to the product catalog.
pub trait CatalogReader {
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
}

/// Read-only access to coupons and shipping options.
pub trait ReferenceDataReader {
    fn list_coupons(&self) -> RepositoryResult<Vec<Coupon>>;
    fn list_shipping_options(&self) -> RepositoryResult<Vec<ShippingOption>>;
}

/// Key/value storage for session snapshots.
///
/// Callers treat writes as fire-and-forget; implementations should still
/// report failures so they can be logged.
pub trait SnapshotStore: Send + Sync {
    fn save_snapshot(&self, key: &str, value: &Value) -> RepositoryResult<()>;
    fn load_snapshot(&self, key: &str) -> RepositoryResult<Option<Value>>;
}

/// Read operations over the remote order API.
#[async_trait]
pub trait OrderReader: Send + Sync {
    async fn list_orders(&self) -> RepositoryResult<Vec<Order>>;
    async fn list_order_lines(&self, order_id: String) -> RepositoryResult<Vec<OrderLine>>;
}

/// Write operations over the remote order API.
#[async_trait]
pub trait OrderWriter: Send + Sync {
    async fn create_order(&self, new_order: NewOrder) -> RepositoryResult<Order>;
    async fn create_order_line(&self, new_line: NewOrderLine) -> RepositoryResult<OrderLine>;
}
