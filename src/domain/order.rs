use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::{CheckoutTotals, PersonalData, ShippingAddress};

/// Lifecycle states of an order stored by the order backend.
///
/// Checkout only writes `Completed`; the others come back from history.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order header saved but not finalized.
    Draft,
    /// Order placed; there is no separate payment step.
    Completed,
    /// Order cancelled and should not be fulfilled.
    Cancelled,
}

/// Order header as returned by the order backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    /// Opaque identifier assigned by the backend.
    pub id: String,
    pub status: OrderStatus,
    /// Amount charged, in the smallest currency unit.
    pub total_amount: i64,
    pub created_at: NaiveDateTime,
}

/// Payload sent to create an order header.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewOrder {
    /// Identifier of the authenticated buyer.
    pub user_id: String,
    pub status: OrderStatus,
    pub customer: PersonalData,
    /// Identifier and name of the chosen shipping option.
    pub shipping_option_id: i32,
    pub shipping_option_name: String,
    pub address: Option<ShippingAddress>,
    /// Code of the coupon in effect, if any.
    pub coupon_code: Option<String>,
    pub subtotal: i64,
    pub shipping: i64,
    pub discount: i64,
    pub total_amount: i64,
}

impl NewOrder {
    /// Build a completed order header for `customer` with the given totals.
    pub fn new(
        user_id: impl Into<String>,
        customer: PersonalData,
        shipping_option_id: i32,
        shipping_option_name: impl Into<String>,
        totals: CheckoutTotals,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            status: OrderStatus::Completed,
            customer,
            shipping_option_id,
            shipping_option_name: shipping_option_name.into(),
            address: None,
            coupon_code: None,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            discount: totals.discount,
            total_amount: totals.total,
        }
    }

    /// Attach the delivery address to the order payload.
    pub fn with_address(mut self, address: ShippingAddress) -> Self {
        self.address = Some(address);
        self
    }

    /// Attach the applied coupon code to the order payload.
    pub fn with_coupon_code(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }
}

/// Line item belonging to an order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: u32,
}

/// Payload sent to attach a line item to an existing order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewOrderLine {
    pub order_id: String,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: u32,
}

impl NewOrderLine {
    pub fn new(
        order_id: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: i64,
        quantity: u32,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
        }
    }
}

/// An order together with its line items, as shown in the purchase history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderHistoryEntry {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderHistoryEntry {
    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}
