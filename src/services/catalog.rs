use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::filter::{FilterCriteria, SortKey};
use crate::domain::product::Product;
use crate::repository::{CatalogReader, RepositoryResult};

/// Collation weights: ASCII punctuation and digits keep their code point and
/// therefore sort before letters, letters are spaced two apart so `ñ` fits
/// right after `n`, anything unfolded sorts last.
const LETTER_BASE: u32 = 0x100;
const UNFOLDED_BASE: u32 = 0x200;

/// Product list loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    products: Vec<Product>,
}

impl CatalogStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Fetch the catalog from `reader`.
    pub fn load<R>(reader: &R) -> RepositoryResult<Self>
    where
        R: CatalogReader + ?Sized,
    {
        let products = reader.list_products().map_err(|err| {
            log::error!("Failed to load catalog: {err}");
            err
        })?;
        log::debug!("Loaded {} products", products.len());
        Ok(Self::new(products))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, product_id: i32) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }

    /// Distinct non-empty categories in the order they first appear.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|product| product.category.as_str())
            .filter(|category| !category.is_empty() && seen.insert(*category))
            .collect()
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> FilteredProducts<'_> {
        filter_products(&self.products, criteria)
    }
}

/// Outcome of running the filter pipeline over a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredProducts<'a> {
    pub items: Vec<&'a Product>,
    /// Size of the catalog the pipeline ran over.
    pub catalog_size: usize,
}

impl FilteredProducts<'_> {
    /// True when nothing matched and the UI should render its empty state.
    pub fn is_empty_state(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn ids(&self) -> Vec<i32> {
        self.items.iter().map(|product| product.id).collect()
    }
}

/// Run search, category, price and rating filters, then sort.
///
/// Sorting is stable, so products that compare equal keep catalog order.
pub fn filter_products<'a>(
    products: &'a [Product],
    criteria: &FilterCriteria,
) -> FilteredProducts<'a> {
    let needle = criteria
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);
    let category = criteria
        .category
        .as_deref()
        .filter(|category| !category.is_empty());

    let mut items: Vec<&Product> = products
        .iter()
        .filter(|product| needle.as_deref().is_none_or(|term| matches_search(product, term)))
        .filter(|product| category.is_none_or(|category| product.category == category))
        .filter(|product| {
            criteria
                .price_range
                .is_none_or(|range| range.contains(product.price))
        })
        .filter(|product| criteria.min_rating.is_none_or(|min| product.rating >= min))
        .collect();

    match criteria.sort {
        SortKey::None => {}
        SortKey::PriceAsc => items.sort_by_key(|product| product.price),
        SortKey::PriceDesc => items.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::RatingDesc => items.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::NameAsc => items.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }

    FilteredProducts {
        items,
        catalog_size: products.len(),
    }
}

fn matches_search(product: &Product, term: &str) -> bool {
    [&product.name, &product.description, &product.category]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
}

/// Spanish-aware name ordering: case and accents are ignored on the first
/// pass, `ñ` sorts between `n` and `o`, and raw bytes break remaining ties.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(collation_key(right))
        .then_with(|| left.cmp(right))
}

fn collation_key(value: &str) -> impl Iterator<Item = u32> + '_ {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| collation_weight(fold_accent(ch)))
}

fn collation_weight(ch: char) -> u32 {
    match ch {
        'ñ' => LETTER_BASE + ('n' as u32 - 'a' as u32) * 2 + 1,
        'a'..='z' => LETTER_BASE + (ch as u32 - 'a' as u32) * 2,
        _ if ch.is_ascii() => ch as u32,
        _ => UNFOLDED_BASE + ch as u32,
    }
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
