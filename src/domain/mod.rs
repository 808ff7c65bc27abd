pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod favorite;
pub mod filter;
pub mod order;
pub mod product;
pub mod shipping;
pub mod user;
