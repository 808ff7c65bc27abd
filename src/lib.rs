pub mod config;
pub mod domain;
pub mod forms;
pub mod repository;
pub mod services;

pub use config::StorefrontConfig;
pub use services::storefront::Storefront;
