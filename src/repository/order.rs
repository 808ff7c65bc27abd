use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{NewOrder, NewOrderLine, Order, OrderLine};
use crate::repository::{OrderReader, OrderWriter, RepositoryError, RepositoryResult};

/// Sandbox order API that keeps orders in memory.
///
/// Mirrors the validation of the real backend (positive price, at least one
/// unit) and can be told to reject requests, which makes it suitable for demos
/// and for exercising checkout failure paths.
#[derive(Debug, Default)]
pub struct InMemoryOrderBackend {
    state: Mutex<BackendState>,
}

#[derive(Debug, Default)]
struct BackendState {
    orders: Vec<Order>,
    payloads: Vec<NewOrder>,
    lines: Vec<OrderLine>,
    reject_orders: bool,
    rejected_products: HashSet<String>,
}

impl InMemoryOrderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, BackendState>> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("order backend lock poisoned".to_string()))
    }

    /// Make every subsequent `create_order` call fail.
    pub fn reject_order_creation(&self, reject: bool) -> RepositoryResult<()> {
        self.lock()?.reject_orders = reject;
        Ok(())
    }

    /// Make line creation fail for lines naming `product_name`.
    pub fn reject_lines_for(&self, product_name: impl Into<String>) -> RepositoryResult<()> {
        self.lock()?.rejected_products.insert(product_name.into());
        Ok(())
    }

    /// Header payloads received so far, in arrival order.
    pub fn submitted_orders(&self) -> RepositoryResult<Vec<NewOrder>> {
        Ok(self.lock()?.payloads.clone())
    }
}

#[async_trait]
impl OrderWriter for InMemoryOrderBackend {
    async fn create_order(&self, new_order: NewOrder) -> RepositoryResult<Order> {
        let mut state = self.lock()?;

        if state.reject_orders {
            return Err(RepositoryError::Unavailable(
                "order creation is disabled".to_string(),
            ));
        }
        if new_order.total_amount < 0 {
            return Err(RepositoryError::Rejected(
                "total amount must not be negative".to_string(),
            ));
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            status: new_order.status,
            total_amount: new_order.total_amount,
            created_at: chrono::Local::now().naive_utc(),
        };

        state.orders.push(order.clone());
        state.payloads.push(new_order);

        Ok(order)
    }

    async fn create_order_line(&self, new_line: NewOrderLine) -> RepositoryResult<OrderLine> {
        let mut state = self.lock()?;

        if !state.orders.iter().any(|order| order.id == new_line.order_id) {
            return Err(RepositoryError::NotFound);
        }
        if state.rejected_products.contains(&new_line.product_name) {
            return Err(RepositoryError::Unavailable(format!(
                "line for `{}` was dropped",
                new_line.product_name
            )));
        }
        if new_line.product_name.trim().is_empty() {
            return Err(RepositoryError::Rejected("product name is required".to_string()));
        }
        if new_line.unit_price <= 0 {
            return Err(RepositoryError::Rejected("price must be positive".to_string()));
        }
        if new_line.quantity == 0 {
            return Err(RepositoryError::Rejected(
                "quantity must be at least one".to_string(),
            ));
        }

        let line = OrderLine {
            id: Uuid::new_v4().to_string(),
            order_id: new_line.order_id,
            product_name: new_line.product_name,
            unit_price: new_line.unit_price,
            quantity: new_line.quantity,
        };
        state.lines.push(line.clone());

        Ok(line)
    }
}

#[async_trait]
impl OrderReader for InMemoryOrderBackend {
    async fn list_orders(&self) -> RepositoryResult<Vec<Order>> {
        Ok(self.lock()?.orders.clone())
    }

    async fn list_order_lines(&self, order_id: String) -> RepositoryResult<Vec<OrderLine>> {
        let state = self.lock()?;

        if !state.orders.iter().any(|order| order.id == order_id) {
            return Err(RepositoryError::NotFound);
        }

        Ok(state
            .lines
            .iter()
            .filter(|line| line.order_id == order_id)
            .cloned()
            .collect())
    }
}
