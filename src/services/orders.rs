use futures::future::join_all;

use crate::domain::order::OrderHistoryEntry;
use crate::repository::OrderReader;
use crate::services::ServiceResult;

/// Loads every past order with its lines, newest first.
///
/// Lines for all orders are requested concurrently.
pub async fn load_order_history<R>(reader: &R) -> ServiceResult<Vec<OrderHistoryEntry>>
where
    R: OrderReader + ?Sized,
{
    let mut orders = reader.list_orders().await.map_err(|err| {
        log::error!("Failed to list orders: {err}");
        err
    })?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let lines = join_all(
        orders
            .iter()
            .map(|order| reader.list_order_lines(order.id.clone())),
    )
    .await;

    let mut history = Vec::with_capacity(orders.len());
    for (order, lines) in orders.into_iter().zip(lines) {
        let lines = lines.map_err(|err| {
            log::error!("Failed to list lines for order {}: {err}", order.id);
            err
        })?;
        history.push(OrderHistoryEntry { order, lines });
    }

    Ok(history)
}
