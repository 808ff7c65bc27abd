use serde::{Deserialize, Serialize};

/// Which branch a favorites toggle took.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteToggle {
    /// The product was not a favorite and has been added.
    Added,
    /// The product was a favorite and has been removed.
    Removed,
}
