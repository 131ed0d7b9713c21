//! Integration tests for GoMarket.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gomarket-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Save/load round-trips through the file store
//! - `cart_scope` - Active-cart scope and shared handle behaviour
//!
//! This library holds the fixtures shared by those tests.

use std::path::PathBuf;

use gomarket_cart::{CartConfig, FileStore};
use gomarket_core::{NewCartItem, Price, ProductId};

/// A file store in a fresh directory that is removed on drop.
pub struct TempCartDir {
    pub config: CartConfig,
}

impl TempCartDir {
    #[must_use]
    pub fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("gomarket-it-{}", uuid::Uuid::new_v4()));
        Self {
            config: CartConfig::default().with_data_dir(dir),
        }
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.config.data_dir.clone()
    }

    #[must_use]
    pub fn store(&self) -> FileStore {
        FileStore::new(self.path())
    }
}

impl Default for TempCartDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempCartDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.config.data_dir);
    }
}

/// A catalog product priced in cents.
///
/// # Panics
///
/// Panics if `cents` is negative.
#[must_use]
pub fn product(id: &str, cents: i64) -> NewCartItem {
    NewCartItem {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        image_url: format!("https://cdn.example/{id}.png"),
        price: Price::from_cents(cents).expect("test prices are non-negative"),
    }
}
