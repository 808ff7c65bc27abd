use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Buyer details collected at checkout, already normalized.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PersonalData {
    pub name: String,
    /// National identifier in `12345678-K` form.
    pub rut: String,
    /// Lowercased e-mail address.
    pub email: String,
    /// Phone number in `+569XXXXXXXX` form.
    pub phone: String,
}

/// Delivery address used by non-pickup shipping options.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub street: String,
    pub postal_code: String,
    pub commune: String,
    pub city: String,
}

/// Money breakdown shown in the order summary.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutTotals {
    pub subtotal: i64,
    pub shipping: i64,
    pub discount: i64,
    /// `subtotal + shipping - discount`, never negative.
    pub total: i64,
}

impl CheckoutTotals {
    pub fn compute(subtotal: i64, shipping: i64, discount: i64) -> Self {
        Self {
            subtotal,
            shipping,
            discount,
            total: (subtotal + shipping - discount).max(0),
        }
    }
}

/// Input fields that must be valid before an order can be submitted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Name,
    Rut,
    Email,
    Phone,
    ShippingOption,
    ShippingAddress,
}

impl CheckoutField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutField::Name => "name",
            CheckoutField::Rut => "rut",
            CheckoutField::Email => "email",
            CheckoutField::Phone => "phone",
            CheckoutField::ShippingOption => "shipping option",
            CheckoutField::ShippingAddress => "shipping address",
        }
    }
}

/// Confirmation returned after every remote write succeeded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CheckoutReceipt {
    /// Identifier assigned by the order backend.
    pub order_id: String,
    /// Short, human-friendly form of the order id.
    pub reference: String,
    pub totals: CheckoutTotals,
    pub created_at: NaiveDateTime,
}

impl CheckoutReceipt {
    /// Length of the reference shown to buyers.
    pub const REFERENCE_LEN: usize = 8;

    /// Derive the short reference from an order id.
    pub fn reference_for(order_id: &str) -> String {
        order_id
            .chars()
            .filter(|ch| *ch != '-')
            .take(Self::REFERENCE_LEN)
            .collect::<String>()
            .to_uppercase()
    }
}
