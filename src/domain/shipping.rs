use serde::{Deserialize, Serialize};

/// Whether a shipping option delivers to an address or is collected in person.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingKind {
    /// Courier delivery, requires a complete address.
    #[default]
    Delivery,
    /// In-person collection, no address needed.
    Pickup,
}

/// Shipping choice offered at checkout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShippingOption {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in the smallest currency unit.
    pub price: i64,
    /// Free-text transit estimate such as `3-5 business days`.
    #[serde(default)]
    pub transit: String,
    #[serde(default)]
    pub kind: ShippingKind,
}

impl ShippingOption {
    /// Build a delivery option.
    pub fn delivery(id: i32, name: impl Into<String>, price: i64) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            transit: String::new(),
            kind: ShippingKind::Delivery,
        }
    }

    /// Build a pickup option.
    pub fn pickup(id: i32, name: impl Into<String>, price: i64) -> Self {
        Self {
            kind: ShippingKind::Pickup,
            ..Self::delivery(id, name, price)
        }
    }

    pub fn with_transit(mut self, transit: impl Into<String>) -> Self {
        self.transit = transit.into();
        self
    }

    pub fn requires_address(&self) -> bool {
        self.kind == ShippingKind::Delivery
    }
}
