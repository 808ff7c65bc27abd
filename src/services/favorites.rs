use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::favorite::FavoriteToggle;
use crate::domain::product::Product;
use crate::repository::{FAVORITES_SNAPSHOT_KEY, SnapshotStore};

/// Products the user marked as favorite, unique by id.
///
/// Entries are full product snapshots so they survive catalog reloads.
pub struct FavoritesSet {
    entries: Vec<Product>,
    store: Arc<dyn SnapshotStore>,
}

impl fmt::Debug for FavoritesSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FavoritesSet")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl FavoritesSet {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            entries: Vec::new(),
            store,
        }
    }

    /// Rebuild the set from its last snapshot, tolerating missing or
    /// malformed data.
    pub fn restore(store: Arc<dyn SnapshotStore>) -> Self {
        let value = match store.load_snapshot(FAVORITES_SNAPSHOT_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return Self::new(store),
            Err(err) => {
                log::warn!("Failed to load favorites snapshot: {err}");
                return Self::new(store);
            }
        };

        let stored: Vec<Product> = match serde_json::from_value(value) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Ignoring malformed favorites snapshot: {err}");
                return Self::new(store);
            }
        };

        let mut seen = HashSet::new();
        let entries = stored
            .into_iter()
            .filter(|product| seen.insert(product.id))
            .collect();

        Self { entries, store }
    }

    /// Add `product` if absent, remove it otherwise.
    pub fn toggle(&mut self, product: &Product) -> FavoriteToggle {
        let outcome = match self.entries.iter().position(|entry| entry.id == product.id) {
            Some(index) => {
                self.entries.remove(index);
                FavoriteToggle::Removed
            }
            None => {
                self.entries.push(product.clone());
                FavoriteToggle::Added
            }
        };
        self.persist();
        outcome
    }

    pub fn is_favorite(&self, product_id: i32) -> bool {
        self.entries.iter().any(|entry| entry.id == product_id)
    }

    /// Drop `product_id` from the set. Absent ids are ignored.
    pub fn remove(&mut self, product_id: i32) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != product_id);
        if self.entries.len() != before {
            self.persist();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Product] {
        &self.entries
    }

    fn persist(&self) {
        let value = match serde_json::to_value(&self.entries) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Failed to serialize favorites snapshot: {err}");
                return;
            }
        };
        if let Err(err) = self.store.save_snapshot(FAVORITES_SNAPSHOT_KEY, &value) {
            log::warn!("Failed to save favorites snapshot: {err}");
        }
    }
}
