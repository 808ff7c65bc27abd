use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::coupon::{AppliedCoupon, Coupon, normalize_code};

/// Reasons a coupon code cannot be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("coupon `{code}` does not exist or is no longer active")]
    NotFound { code: String },
    #[error("coupon `{code}` expired on {expired_on}")]
    Expired { code: String, expired_on: NaiveDate },
    #[error("a minimum purchase of {minimum} is required for this coupon")]
    MinimumNotMet { minimum: i64, subtotal: i64 },
}

/// Apply `code` against today's date.
pub fn apply_coupon(
    code: &str,
    subtotal: i64,
    coupons: &[Coupon],
) -> Result<AppliedCoupon, CouponError> {
    apply_coupon_on(code, subtotal, coupons, chrono::Local::now().date_naive())
}

/// Look up `code` among active coupons and compute its discount on `subtotal`.
pub fn apply_coupon_on(
    code: &str,
    subtotal: i64,
    coupons: &[Coupon],
    today: NaiveDate,
) -> Result<AppliedCoupon, CouponError> {
    let normalized = normalize_code(code);

    let coupon = coupons
        .iter()
        .find(|coupon| coupon.active && coupon.normalized_code() == normalized)
        .ok_or_else(|| CouponError::NotFound {
            code: normalized.clone(),
        })?;

    if let Some(expired_on) = coupon.expires_on
        && coupon.is_expired_on(today)
    {
        return Err(CouponError::Expired {
            code: normalized,
            expired_on,
        });
    }

    if subtotal < coupon.minimum_subtotal {
        return Err(CouponError::MinimumNotMet {
            minimum: coupon.minimum_subtotal,
            subtotal,
        });
    }

    let discount = coupon.discount_for(subtotal);
    log::debug!("Applied coupon {normalized} for a discount of {discount}");

    Ok(AppliedCoupon {
        coupon: coupon.clone(),
        discount,
    })
}
