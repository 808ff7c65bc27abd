use thiserror::Error;

use crate::repository::RepositoryError;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod favorites;
pub mod orders;
pub mod storefront;

/// Result type returned by session-level operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A collaborator failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("product {0} not found")]
    ProductNotFound(i32),
    #[error("shipping option {0} not found")]
    ShippingOptionNotFound(i32),
    #[error(transparent)]
    Cart(#[from] cart::CartError),
    #[error(transparent)]
    Coupon(#[from] coupons::CouponError),
    #[error(transparent)]
    Checkout(#[from] checkout::CheckoutError),
    /// User input could not be parsed.
    #[error("form error: {0}")]
    Form(String),
}
