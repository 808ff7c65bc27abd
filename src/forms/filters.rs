use serde::Deserialize;
use thiserror::Error;

use crate::domain::filter::{FilterCriteria, PriceRange, SortKey};

/// Highest rating a product can carry.
const MAX_RATING: f64 = 5.0;

/// Errors that can occur while parsing catalog filter parameters.
#[derive(Debug, Error)]
pub enum FilterFormError {
    /// The query string itself could not be decoded.
    #[error("invalid filter query: {0}")]
    Query(#[from] serde_qs::Error),
    /// The `price` parameter is neither `min-max` nor `min+`.
    #[error("invalid price range `{0}`")]
    InvalidPriceRange(String),
    /// The `rating` parameter is not a number between 0 and 5.
    #[error("invalid rating `{0}`")]
    InvalidRating(String),
    /// The `sort` parameter names an unknown ordering.
    #[error("unknown sort key `{0}`")]
    InvalidSortKey(String),
}

/// Catalog filter controls as they appear in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    /// `min-max` or `min+`.
    pub price: Option<String>,
    pub rating: Option<String>,
    pub sort: Option<String>,
}

impl FilterQuery {
    /// Decode `search=…&category=…&price=…&rating=…&sort=…`.
    pub fn from_query_str(query: &str) -> Result<Self, FilterFormError> {
        Ok(serde_qs::from_str(query.trim_start_matches('?'))?)
    }

    /// Convert the raw parameters into filter criteria. Blank values are ignored.
    pub fn into_criteria(self) -> Result<FilterCriteria, FilterFormError> {
        let mut criteria = FilterCriteria::new();

        if let Some(search) = non_blank(self.search) {
            criteria = criteria.search(search);
        }

        if let Some(category) = non_blank(self.category) {
            criteria = criteria.category(category);
        }

        if let Some(price) = non_blank(self.price) {
            let range = restore_open_ended(&price)
                .parse::<PriceRange>()
                .map_err(FilterFormError::InvalidPriceRange)?;
            criteria = criteria.price_range(range);
        }

        if let Some(rating) = non_blank(self.rating) {
            let value = rating
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| (0.0..=MAX_RATING).contains(value))
                .ok_or_else(|| FilterFormError::InvalidRating(rating.clone()))?;
            criteria = criteria.min_rating(value);
        }

        if let Some(sort) = self.sort {
            let key = sort
                .parse::<SortKey>()
                .map_err(FilterFormError::InvalidSortKey)?;
            criteria = criteria.sort(key);
        }

        Ok(criteria)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// An unescaped `+` arrives decoded as a space, so `50000+` reads `50000 `.
fn restore_open_ended(price: &str) -> String {
    let value = price.trim_start();
    if value.ends_with(' ') {
        format!("{}+", value.trim_end())
    } else {
        value.to_string()
    }
}
