use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_SNAPSHOT_DIR: &str = ".storefront";

/// Locations of the bundled file collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding `products.json` (or `products.csv`), `coupons.json`
    /// and `shipping.json`.
    pub data_dir: PathBuf,
    /// Directory where cart and favorites snapshots are written.
    pub snapshot_dir: PathBuf,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
        }
    }
}

impl StorefrontConfig {
    /// Read `STOREFRONT_DATA_DIR` and `STOREFRONT_SNAPSHOT_DIR`, loading a
    /// `.env` file first when present.
    pub fn from_env() -> Self {
        dotenv().ok();

        let data_dir = env::var("STOREFRONT_DATA_DIR").unwrap_or(DEFAULT_DATA_DIR.to_string());
        let snapshot_dir =
            env::var("STOREFRONT_SNAPSHOT_DIR").unwrap_or(DEFAULT_SNAPSHOT_DIR.to_string());

        Self {
            data_dir: data_dir.into(),
            snapshot_dir: snapshot_dir.into(),
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }
}
