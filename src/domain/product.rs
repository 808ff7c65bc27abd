use serde::{Deserialize, Serialize};

/// Domain representation of a product offered in the catalog.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique, stable identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Longer description shown to users.
    #[serde(default)]
    pub description: String,
    /// Price represented in the smallest currency unit.
    pub price: i64,
    /// Category label the product belongs to.
    #[serde(default)]
    pub category: String,
    /// Units available when the catalog was fetched.
    #[serde(default)]
    pub stock_quantity: u32,
    /// Average rating in the `[0, 5]` range.
    #[serde(default)]
    pub rating: f64,
    /// Ordered image URLs, the first one being the cover image. May be empty
    /// for imported rows without pictures; such products have no cover.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Build a product with the mandatory fields and empty optional data.
    pub fn new(id: i32, name: impl Into<String>, price: i64, stock_quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
            stock_quantity,
            rating: 0.0,
            images: Vec::new(),
        }
    }

    /// Attach a descriptive text to the product.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a category label to the product.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the product rating, clamped to `[0, 5]`.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating.clamp(0.0, 5.0);
        self
    }

    /// Append an image URL to the product gallery.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    /// Cover image used by cart lines and favorites.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }
}
