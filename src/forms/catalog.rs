use std::collections::HashSet;
use std::io::Cursor;

use csv::{StringRecord, Trim};
use thiserror::Error;

use crate::domain::product::Product;

/// Separator used between image URLs inside the `images` column.
const IMAGE_SEPARATOR: char = '|';

/// Result type returned by the catalog import helpers.
pub type CatalogFormResult<T> = Result<T, CatalogFormError>;

/// Errors that can occur while importing a catalog spreadsheet.
#[derive(Debug, Error)]
pub enum CatalogFormError {
    /// The uploaded CSV is missing required columns.
    #[error("upload is missing the required `id`, `name`/`title` or `price` headers")]
    MissingRequiredHeaders,
    /// A CSV row did not include a product name.
    #[error("row {row} is missing a product name")]
    UploadMissingName { row: usize },
    /// A CSV row contained an identifier that is not an integer.
    #[error("row {row} has invalid id `{value}`")]
    UploadInvalidId { row: usize, value: String },
    /// A CSV row reused an identifier from an earlier row.
    #[error("row {row} repeats product id {id}")]
    UploadDuplicateId { row: usize, id: i32 },
    /// A CSV row contained a negative or non-numeric price.
    #[error("row {row} has invalid price `{value}`")]
    UploadInvalidPrice { row: usize, value: String },
    /// A CSV row contained a stock value that is not a non-negative integer.
    #[error("row {row} has invalid stock `{value}`")]
    UploadInvalidStock { row: usize, value: String },
    /// A CSV row contained a rating outside `[0, 5]`.
    #[error("row {row} has invalid rating `{value}`")]
    UploadInvalidRating { row: usize, value: String },
    /// The uploaded CSV did not contain any usable products.
    #[error("upload contains no products")]
    EmptyUpload,
    /// CSV parsing failures.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Raw catalog spreadsheet, typically read from `products.csv`.
#[derive(Debug)]
pub struct UploadCatalogForm {
    /// Raw CSV bytes.
    pub bytes: Vec<u8>,
}

impl UploadCatalogForm {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parse the CSV and convert it into catalog products.
    pub fn into_products(self) -> CatalogFormResult<Vec<Product>> {
        let cursor = Cursor::new(self.bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(cursor);

        let headers = reader.headers()?.clone();
        let indexes = locate_catalog_headers(&headers);

        let (Some(id_index), Some(price_index)) = (indexes.id_index, indexes.price_index) else {
            return Err(CatalogFormError::MissingRequiredHeaders);
        };
        if indexes.name_index.is_none() && indexes.title_index.is_none() {
            return Err(CatalogFormError::MissingRequiredHeaders);
        }

        let mut products = Vec::new();
        let mut seen_ids = HashSet::new();

        for (index, row) in reader.records().enumerate() {
            let row_number = index + 2; // account for header row
            let record = row?;

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let id_raw = record.get(id_index).unwrap_or("");
            let id = id_raw
                .parse::<i32>()
                .map_err(|_| CatalogFormError::UploadInvalidId {
                    row: row_number,
                    value: id_raw.to_string(),
                })?;
            if !seen_ids.insert(id) {
                return Err(CatalogFormError::UploadDuplicateId {
                    row: row_number,
                    id,
                });
            }

            let name = sanitize_inline_text(resolve_product_name(
                &record,
                indexes.name_index,
                indexes.title_index,
            ));
            if name.is_empty() {
                return Err(CatalogFormError::UploadMissingName { row: row_number });
            }

            let price_raw = record.get(price_index).unwrap_or("");
            let price = parse_amount(price_raw).ok_or_else(|| {
                CatalogFormError::UploadInvalidPrice {
                    row: row_number,
                    value: price_raw.to_string(),
                }
            })?;

            let stock_raw = indexes
                .stock_index
                .and_then(|idx| record.get(idx))
                .unwrap_or("");
            let stock = if stock_raw.is_empty() {
                0
            } else {
                stock_raw
                    .parse::<u32>()
                    .map_err(|_| CatalogFormError::UploadInvalidStock {
                        row: row_number,
                        value: stock_raw.to_string(),
                    })?
            };

            let mut product = Product::new(id, name, price, stock);

            if let Some(description) = indexes
                .description_index
                .and_then(|idx| record.get(idx))
                .map(sanitize_inline_text)
            {
                product = product.with_description(description);
            }

            if let Some(category) = indexes
                .category_index
                .and_then(|idx| record.get(idx))
                .map(sanitize_inline_text)
            {
                product = product.with_category(category);
            }

            if let Some(rating_raw) = indexes
                .rating_index
                .and_then(|idx| record.get(idx))
                .filter(|value| !value.is_empty())
            {
                let rating = rating_raw
                    .parse::<f64>()
                    .ok()
                    .filter(|value| (0.0..=5.0).contains(value))
                    .ok_or_else(|| CatalogFormError::UploadInvalidRating {
                        row: row_number,
                        value: rating_raw.to_string(),
                    })?;
                product = product.with_rating(rating);
            }

            if let Some(images) = indexes.images_index.and_then(|idx| record.get(idx)) {
                for url in images
                    .split(IMAGE_SEPARATOR)
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                {
                    product = product.with_image(url);
                }
            }

            products.push(product);
        }

        if products.is_empty() {
            return Err(CatalogFormError::EmptyUpload);
        }

        Ok(products)
    }
}

struct CatalogHeaderIndexes {
    id_index: Option<usize>,
    name_index: Option<usize>,
    title_index: Option<usize>,
    description_index: Option<usize>,
    price_index: Option<usize>,
    category_index: Option<usize>,
    stock_index: Option<usize>,
    rating_index: Option<usize>,
    images_index: Option<usize>,
}

fn locate_catalog_headers(headers: &StringRecord) -> CatalogHeaderIndexes {
    CatalogHeaderIndexes {
        id_index: locate_header(headers, "id"),
        name_index: locate_header(headers, "name"),
        title_index: locate_header(headers, "title"),
        description_index: locate_header(headers, "description"),
        price_index: locate_header(headers, "price"),
        category_index: locate_header(headers, "category"),
        stock_index: locate_header(headers, "stock"),
        rating_index: locate_header(headers, "rating"),
        images_index: locate_header(headers, "images"),
    }
}

fn locate_header(headers: &StringRecord, expected: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(expected))
}

fn resolve_product_name(
    record: &StringRecord,
    name_index: Option<usize>,
    title_index: Option<usize>,
) -> &str {
    if let Some(index) = name_index
        && let Some(value) = record.get(index)
        && !value.trim().is_empty()
    {
        return value;
    }

    if let Some(index) = title_index
        && let Some(value) = record.get(index)
        && !value.trim().is_empty()
    {
        return value;
    }

    ""
}

/// Parses a non-negative amount, accepting `.` thousands separators (`10.990`).
fn parse_amount(input: &str) -> Option<i64> {
    let digits: String = input.chars().filter(|ch| *ch != '.').collect();
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok()
}

pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}
