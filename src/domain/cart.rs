use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// A single product entry in the shopping cart.
///
/// Name, price and stock are captured when the product is first added, so a
/// later catalog change never rewrites a line the user already holds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartLine {
    /// Identifier of the product this line refers to.
    pub product_id: i32,
    /// Product name at the time of adding.
    pub name: String,
    /// Unit price at the time of adding, in the smallest currency unit.
    pub unit_price: i64,
    /// Units held in the cart, always in `1..=stock_ceiling`.
    pub quantity: u32,
    /// Stock available when the product was added.
    pub stock_ceiling: u32,
    /// Cover image shown next to the line.
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLine {
    /// Snapshot `product` into a new line holding `quantity` units.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            stock_ceiling: product.stock_quantity,
            image: product.primary_image().map(str::to_string),
        }
    }

    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }

    /// Whether the line satisfies `1 <= quantity <= stock_ceiling`.
    pub fn is_within_ceiling(&self) -> bool {
        self.quantity >= 1 && self.quantity <= self.stock_ceiling
    }
}
