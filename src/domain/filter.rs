use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort order applied as the last stage of catalog filtering.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Keep the catalog order.
    #[default]
    None,
    /// Cheapest products first.
    PriceAsc,
    /// Most expensive products first.
    PriceDesc,
    /// Best rated products first.
    RatingDesc,
    /// Alphabetical by name.
    NameAsc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::RatingDesc => "rating-desc",
            SortKey::NameAsc => "name-asc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "none" => Ok(SortKey::None),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "rating-desc" => Ok(SortKey::RatingDesc),
            "name-asc" => Ok(SortKey::NameAsc),
            other => Err(other.to_string()),
        }
    }
}

/// Inclusive price interval, optionally open on the upper end.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    /// Lowest accepted price.
    pub min: i64,
    /// Highest accepted price, `None` for an open-ended `min+` range.
    pub max: Option<i64>,
}

impl PriceRange {
    /// Closed interval `[min, max]`.
    pub fn between(min: i64, max: i64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// Open-ended interval `price >= min`.
    pub fn at_least(min: i64) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, price: i64) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

impl FromStr for PriceRange {
    type Err = String;

    /// Parses the `min-max` and `min+` notations used by the filter controls.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();

        if let Some(min) = trimmed.strip_suffix('+') {
            let min = min.trim().parse::<i64>().map_err(|_| trimmed.to_string())?;
            return Ok(PriceRange::at_least(min));
        }

        let Some((min, max)) = trimmed.split_once('-') else {
            return Err(trimmed.to_string());
        };

        let min = min.trim().parse::<i64>().map_err(|_| trimmed.to_string())?;
        let max = max.trim().parse::<i64>().map_err(|_| trimmed.to_string())?;

        if max < min {
            return Err(trimmed.to_string());
        }

        Ok(PriceRange::between(min, max))
    }
}

/// Criteria applied by the catalog filter pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Free text matched against name, description and category.
    pub search: Option<String>,
    /// Exact category label.
    pub category: Option<String>,
    /// Price interval the product price must fall in.
    pub price_range: Option<PriceRange>,
    /// Minimum accepted rating.
    pub min_rating: Option<f64>,
    /// Final ordering of the matches.
    pub sort: SortKey,
}

impl FilterCriteria {
    /// Criteria that let every product through in catalog order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by a free text search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Filter by an exact category label.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by a price interval.
    pub fn price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    /// Filter out products rated below `rating`.
    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    /// Order the results by `key`.
    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort = key;
        self
    }
}
