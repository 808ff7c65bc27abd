use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use super::{
    CatalogReader, OrderReader, OrderWriter, ReferenceDataReader, RepositoryResult, SnapshotStore,
};
use crate::domain::{
    coupon::Coupon,
    order::{NewOrder, NewOrderLine, Order, OrderLine},
    product::Product,
    shipping::ShippingOption,
};

mock! {
    pub CatalogReader {}

    impl CatalogReader for CatalogReader {
        fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    }
}

mock! {
    pub ReferenceDataReader {}

    impl ReferenceDataReader for ReferenceDataReader {
        fn list_coupons(&self) -> RepositoryResult<Vec<Coupon>>;
        fn list_shipping_options(&self) -> RepositoryResult<Vec<ShippingOption>>;
    }
}

mock! {
    pub SnapshotStore {}

    impl SnapshotStore for SnapshotStore {
        fn save_snapshot(&self, key: &str, value: &Value) -> RepositoryResult<()>;
        fn load_snapshot(&self, key: &str) -> RepositoryResult<Option<Value>>;
    }
}

mock! {
    pub OrderReader {}

    #[async_trait]
    impl OrderReader for OrderReader {
        async fn list_orders(&self) -> RepositoryResult<Vec<Order>>;
        async fn list_order_lines(&self, order_id: String) -> RepositoryResult<Vec<OrderLine>>;
    }
}

mock! {
    pub OrderWriter {}

    #[async_trait]
    impl OrderWriter for OrderWriter {
        async fn create_order(&self, new_order: NewOrder) -> RepositoryResult<Order>;
        async fn create_order_line(&self, new_line: NewOrderLine) -> RepositoryResult<OrderLine>;
    }
}
