use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the subtotal.
    Percentage,
    /// `discount_value` is an amount in the smallest currency unit.
    Fixed,
}

/// Discount code reference record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coupon {
    /// Code typed by the user, matched case-insensitively.
    pub code: String,
    /// Text shown once the coupon is applied.
    #[serde(default)]
    pub description: String,
    /// Percentage or fixed amount depending on `discount_type`.
    pub discount_value: i64,
    pub discount_type: DiscountType,
    /// Subtotal required before the coupon can be used.
    #[serde(default)]
    pub minimum_subtotal: i64,
    /// Upper bound for the computed discount.
    #[serde(default)]
    pub maximum_discount: Option<i64>,
    /// Inactive coupons are never matched.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Last day the coupon can be applied.
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

fn default_active() -> bool {
    true
}

impl Coupon {
    /// Build an active coupon with no minimum, cap or expiry.
    pub fn new(code: impl Into<String>, discount_type: DiscountType, discount_value: i64) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            discount_value,
            discount_type,
            minimum_subtotal: 0,
            maximum_discount: None,
            active: true,
            expires_on: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_minimum_subtotal(mut self, minimum_subtotal: i64) -> Self {
        self.minimum_subtotal = minimum_subtotal;
        self
    }

    pub fn with_maximum_discount(mut self, maximum_discount: i64) -> Self {
        self.maximum_discount = Some(maximum_discount);
        self
    }

    pub fn with_expiry(mut self, expires_on: NaiveDate) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Uppercased, trimmed form of the coupon code used for lookups.
    pub fn normalized_code(&self) -> String {
        normalize_code(&self.code)
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|last_day| today > last_day)
    }

    /// Discount granted on `subtotal`, never more than the subtotal itself.
    ///
    /// Percentages are rounded half-up to the smallest currency unit.
    pub fn discount_for(&self, subtotal: i64) -> i64 {
        let subtotal = subtotal.max(0);
        let raw = match self.discount_type {
            DiscountType::Percentage => (subtotal * self.discount_value + 50) / 100,
            DiscountType::Fixed => self.discount_value,
        };
        let capped = match self.maximum_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        };
        capped.clamp(0, subtotal)
    }
}

/// Normalize a user supplied coupon code for comparison.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The single coupon in effect for a checkout session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    /// Discount computed against the subtotal at application time.
    pub discount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_discount_rounds_half_up() {
        let coupon = Coupon::new("TEN", DiscountType::Percentage, 10);
        assert_eq!(coupon.discount_for(20000), 2000);
        assert_eq!(coupon.discount_for(1995), 200);
        assert_eq!(coupon.discount_for(1994), 199);
    }

    #[test]
    fn percentage_discount_respects_cap() {
        let coupon = Coupon::new("HALF", DiscountType::Percentage, 50).with_maximum_discount(3000);
        assert_eq!(coupon.discount_for(4000), 2000);
        assert_eq!(coupon.discount_for(100000), 3000);
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let coupon = Coupon::new("BIG", DiscountType::Fixed, 5000);
        assert_eq!(coupon.discount_for(3000), 3000);
        assert_eq!(coupon.discount_for(0), 0);
    }

    #[test]
    fn expiry_is_inclusive_of_last_day() {
        let last_day = NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date");
        let coupon = Coupon::new("MARCH", DiscountType::Fixed, 100).with_expiry(last_day);
        assert!(!coupon.is_expired_on(last_day));
        assert!(coupon.is_expired_on(last_day.succ_opt().expect("next day")));
    }

    #[test]
    fn missing_optional_fields_deserialize_with_defaults() {
        let coupon: Coupon = serde_json::from_str(
            r#"{"code":"promo10","discount_value":10,"discount_type":"percentage"}"#,
        )
        .expect("coupon should parse");
        assert!(coupon.active);
        assert_eq!(coupon.minimum_subtotal, 0);
        assert_eq!(coupon.normalized_code(), "PROMO10");
    }
}
