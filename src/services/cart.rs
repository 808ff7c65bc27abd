use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::cart::CartLine;
use crate::domain::product::Product;
use crate::repository::{CART_SNAPSHOT_KEY, SnapshotStore};

pub type CartResult<T> = Result<T, CartError>;

/// Rejected cart mutations. The ledger is left unchanged in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("product {product_id} is out of stock")]
    OutOfStock { product_id: i32 },
    #[error("only {available} units of product {product_id} available, {requested} requested")]
    InsufficientStock {
        product_id: i32,
        requested: u32,
        available: u32,
    },
    #[error("quantity must be at least one")]
    InvalidQuantity,
    #[error("product {product_id} is not in the cart")]
    LineNotFound { product_id: i32 },
}

/// Shopping cart keyed by product id.
///
/// Every line satisfies `1 <= quantity <= stock_ceiling` and no product id
/// appears twice. Each mutation writes a snapshot to the store; write
/// failures are logged and otherwise ignored.
pub struct CartLedger {
    lines: Vec<CartLine>,
    store: Arc<dyn SnapshotStore>,
}

impl fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartLedger")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl CartLedger {
    /// Empty cart persisting to `store`.
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            lines: Vec::new(),
            store,
        }
    }

    /// Rebuild the cart from its last snapshot.
    ///
    /// A missing or unreadable snapshot yields an empty cart. Lines breaking
    /// the ledger invariants are dropped.
    pub fn restore(store: Arc<dyn SnapshotStore>) -> Self {
        let value = match store.load_snapshot(CART_SNAPSHOT_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return Self::new(store),
            Err(err) => {
                log::warn!("Failed to load cart snapshot: {err}");
                return Self::new(store);
            }
        };

        let stored: Vec<CartLine> = match serde_json::from_value(value) {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!("Ignoring malformed cart snapshot: {err}");
                return Self::new(store);
            }
        };

        let stored_count = stored.len();
        let mut seen = HashSet::new();
        let lines: Vec<CartLine> = stored
            .into_iter()
            .filter(|line| line.is_within_ceiling() && seen.insert(line.product_id))
            .collect();

        if lines.len() < stored_count {
            log::warn!(
                "Dropped {} invalid cart lines from snapshot",
                stored_count - lines.len()
            );
        }

        Self { lines, store }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i32) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// Returns the resulting line quantity.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> CartResult<u32> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if product.is_out_of_stock() {
            return Err(CartError::OutOfStock {
                product_id: product.id,
            });
        }

        let new_quantity = match self.position(product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                let requested = line.quantity.saturating_add(quantity);
                if requested > line.stock_ceiling {
                    return Err(CartError::InsufficientStock {
                        product_id: product.id,
                        requested,
                        available: line.stock_ceiling,
                    });
                }
                line.quantity = requested;
                requested
            }
            None => {
                if quantity > product.stock_quantity {
                    return Err(CartError::InsufficientStock {
                        product_id: product.id,
                        requested: quantity,
                        available: product.stock_quantity,
                    });
                }
                self.lines.push(CartLine::from_product(product, quantity));
                quantity
            }
        };

        self.persist();
        Ok(new_quantity)
    }

    /// Shift a line's quantity by `delta`. Reaching zero removes the line.
    pub fn change_quantity(&mut self, product_id: i32, delta: i64) -> CartResult<()> {
        let index = self
            .position(product_id)
            .ok_or(CartError::LineNotFound { product_id })?;
        let target = i64::from(self.lines[index].quantity).saturating_add(delta);
        self.apply_quantity(index, target)
    }

    /// Absolute form of [`CartLedger::change_quantity`].
    pub fn set_quantity(&mut self, product_id: i32, quantity: u32) -> CartResult<()> {
        let index = self
            .position(product_id)
            .ok_or(CartError::LineNotFound { product_id })?;
        self.apply_quantity(index, i64::from(quantity))
    }

    fn apply_quantity(&mut self, index: usize, target: i64) -> CartResult<()> {
        if target <= 0 {
            self.lines.remove(index);
            self.persist();
            return Ok(());
        }

        let line = &mut self.lines[index];
        let ceiling = line.stock_ceiling;
        match u32::try_from(target) {
            Ok(quantity) if quantity <= ceiling => line.quantity = quantity,
            _ => {
                return Err(CartError::InsufficientStock {
                    product_id: line.product_id,
                    requested: u32::try_from(target).unwrap_or(u32::MAX),
                    available: ceiling,
                });
            }
        }

        self.persist();
        Ok(())
    }

    /// Remove the line for `product_id`. Removing an absent line is a no-op.
    pub fn remove_product(&mut self, product_id: i32) {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    pub fn empty_cart(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn subtotal(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn total_item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    fn position(&self, product_id: i32) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }

    fn persist(&self) {
        let value = match serde_json::to_value(&self.lines) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Failed to serialize cart snapshot: {err}");
                return;
            }
        };
        if let Err(err) = self.store.save_snapshot(CART_SNAPSHOT_KEY, &value) {
            log::warn!("Failed to save cart snapshot: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::repository::mock::MockSnapshotStore;
    use crate::repository::{MemorySnapshotStore, RepositoryError};

    fn memory_store() -> Arc<dyn SnapshotStore> {
        Arc::new(MemorySnapshotStore::new())
    }

    fn coffee() -> Product {
        Product::new(1, "Café", 10000, 3).with_image("https://img.example/cafe.jpg")
    }

    fn tea() -> Product {
        Product::new(2, "Té verde", 2500, 10)
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = CartLedger::new(memory_store());

        assert_eq!(cart.add_product(&coffee(), 1), Ok(1));
        assert_eq!(cart.add_product(&coffee(), 2), Ok(3));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.subtotal(), 30000);
        assert_eq!(
            cart.line(1).and_then(|line| line.image.as_deref()),
            Some("https://img.example/cafe.jpg")
        );
    }

    #[test]
    fn product_without_images_gets_a_line_without_cover() {
        let mut cart = CartLedger::new(memory_store());

        cart.add_product(&tea(), 1).expect("add");

        assert!(tea().images.is_empty());
        assert_eq!(cart.line(2).and_then(|line| line.image.as_deref()), None);
        assert_eq!(cart.subtotal(), 2500);
    }

    #[test]
    fn exceeding_stock_leaves_ledger_unchanged() {
        let mut cart = CartLedger::new(memory_store());
        cart.add_product(&coffee(), 2).expect("add within stock");
        cart.add_product(&tea(), 1).expect("add within stock");
        let before = cart.lines().to_vec();

        assert_eq!(
            cart.add_product(&coffee(), 2),
            Err(CartError::InsufficientStock {
                product_id: 1,
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(
            cart.change_quantity(1, 2),
            Err(CartError::InsufficientStock {
                product_id: 1,
                requested: 4,
                available: 3,
            })
        );
        assert!(cart.set_quantity(2, 11).is_err());
        assert_eq!(cart.lines(), before.as_slice());
    }

    #[test]
    fn extreme_deltas_saturate_instead_of_overflowing() {
        let mut cart = CartLedger::new(memory_store());
        cart.add_product(&coffee(), 2).expect("add within stock");
        let before = cart.lines().to_vec();

        assert_eq!(
            cart.change_quantity(1, i64::MAX),
            Err(CartError::InsufficientStock {
                product_id: 1,
                requested: u32::MAX,
                available: 3,
            })
        );
        assert_eq!(cart.lines(), before.as_slice());

        cart.change_quantity(1, i64::MIN).expect("remove");
        assert!(cart.is_empty());
    }

    #[test]
    fn first_add_is_checked_against_catalog_stock() {
        let mut cart = CartLedger::new(memory_store());

        assert!(matches!(
            cart.add_product(&coffee(), 4),
            Err(CartError::InsufficientStock { requested: 4, .. })
        ));
        assert_eq!(
            cart.add_product(&Product::new(9, "Agotado", 100, 0), 1),
            Err(CartError::OutOfStock { product_id: 9 })
        );
        assert_eq!(cart.add_product(&tea(), 0), Err(CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn quantity_reaching_zero_removes_line() {
        let mut cart = CartLedger::new(memory_store());
        cart.add_product(&tea(), 2).expect("add");

        cart.change_quantity(2, -1).expect("decrement");
        assert_eq!(cart.line(2).map(|line| line.quantity), Some(1));

        cart.change_quantity(2, -5).expect("remove");
        assert!(cart.is_empty());
        assert_eq!(
            cart.change_quantity(2, 1),
            Err(CartError::LineNotFound { product_id: 2 })
        );
    }

    #[test]
    fn remove_is_idempotent_and_empty_clears() {
        let mut cart = CartLedger::new(memory_store());
        cart.add_product(&coffee(), 1).expect("add");
        cart.add_product(&tea(), 1).expect("add");

        cart.remove_product(1);
        cart.remove_product(1);
        assert_eq!(cart.lines().len(), 1);

        cart.empty_cart();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), 0);
    }

    #[test]
    fn snapshot_failures_do_not_surface() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_save_snapshot()
            .times(2)
            .withf(|key, _| key == CART_SNAPSHOT_KEY)
            .returning(|_, _| Err(RepositoryError::Unavailable("disk full".to_string())));
        let mut cart = CartLedger::new(Arc::new(store));

        assert_eq!(cart.add_product(&tea(), 1), Ok(1));
        cart.empty_cart();
    }

    #[test]
    fn restore_round_trips_through_the_store() {
        let store = memory_store();
        let mut cart = CartLedger::new(Arc::clone(&store));
        cart.add_product(&coffee(), 2).expect("add");

        let restored = CartLedger::restore(store);

        assert_eq!(restored.lines(), cart.lines());
    }

    #[test]
    fn restore_drops_invalid_and_duplicate_lines() {
        let store = memory_store();
        store
            .save_snapshot(
                CART_SNAPSHOT_KEY,
                &json!([
                    {"product_id": 1, "name": "Café", "unit_price": 10000, "quantity": 2, "stock_ceiling": 3},
                    {"product_id": 1, "name": "Café", "unit_price": 10000, "quantity": 1, "stock_ceiling": 3},
                    {"product_id": 2, "name": "Té", "unit_price": 2500, "quantity": 0, "stock_ceiling": 3},
                    {"product_id": 3, "name": "Pan", "unit_price": 900, "quantity": 5, "stock_ceiling": 4}
                ]),
            )
            .expect("seed snapshot");

        let cart = CartLedger::restore(store);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(1).map(|line| line.quantity), Some(2));
    }

    #[test]
    fn malformed_snapshot_restores_empty_cart() {
        let store = memory_store();
        store
            .save_snapshot(CART_SNAPSHOT_KEY, &json!({"not": "a list"}))
            .expect("seed snapshot");

        assert!(CartLedger::restore(store).is_empty());
    }
}
