//! Single-owner cart state and its persistence.

use std::sync::Arc;

use gomarket_core::{CartCollection, NewCartItem, ProductId};
use tracing::{debug, instrument, warn};

use crate::config::CartConfig;
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Cart state backed by a key-value store.
///
/// Mutations only touch memory. [`CartStore::save`] writes the current
/// (post-mutation) collection, so the caller decides when and whether to
/// await persistence.
pub struct CartStore {
    products: CartCollection,
    storage: Arc<dyn KeyValueStore>,
    storage_key: String,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("products", &self.products)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty store. Call [`CartStore::initialize`] to load saved state.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        Self {
            products: CartCollection::new(),
            storage,
            storage_key: config.storage_key.clone(),
        }
    }

    /// Create a store and load the persisted cart.
    pub async fn open(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        let mut store = Self::new(storage, config);
        store.initialize().await;
        store
    }

    /// Load the persisted cart, replacing the in-memory collection.
    ///
    /// A missing value leaves the cart empty. Read failures and undecodable
    /// values are logged and treated as missing.
    #[instrument(skip(self), fields(key = %self.storage_key))]
    pub async fn initialize(&mut self) {
        let raw = match self.storage.get(&self.storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved cart, starting empty");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved cart, starting empty");
                return;
            }
        };

        match serde_json::from_str::<CartCollection>(&raw) {
            Ok(products) => {
                debug!(lines = products.len(), "Loaded saved cart");
                self.products = products;
            }
            Err(e) => {
                warn!(error = %e, "Saved cart is not a valid collection, starting empty");
            }
        }
    }

    /// Current cart contents.
    #[must_use]
    pub const fn products(&self) -> &CartCollection {
        &self.products
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Add one unit of `product`, merging with an existing line of the same ID.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub fn add_to_cart(&mut self, product: NewCartItem) -> &CartCollection {
        self.products = self.products.with_added(product);
        debug!(lines = self.products.len(), "Added to cart");
        &self.products
    }

    /// Add one unit to the line for `id`. No-op if absent.
    #[instrument(skip(self))]
    pub fn increment(&mut self, id: &ProductId) -> &CartCollection {
        self.products = self.products.with_incremented(id);
        &self.products
    }

    /// Remove one unit from the line for `id`, never below 1. No-op if absent.
    #[instrument(skip(self))]
    pub fn decrement(&mut self, id: &ProductId) -> &CartCollection {
        self.products = self.products.with_decremented(id);
        &self.products
    }

    /// Persist the current collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be encoded or the storage
    /// write fails.
    pub async fn save(&self) -> Result<()> {
        self.writer().write(&self.products).await
    }

    /// A detached writer for this store's storage key.
    ///
    /// Lets a caller persist a snapshot without holding on to the store.
    #[must_use]
    pub fn writer(&self) -> CartWriter {
        CartWriter {
            storage: Arc::clone(&self.storage),
            storage_key: self.storage_key.clone(),
        }
    }
}

/// Writes cart snapshots under one storage key.
#[derive(Clone)]
pub struct CartWriter {
    storage: Arc<dyn KeyValueStore>,
    storage_key: String,
}

impl std::fmt::Debug for CartWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartWriter")
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

impl CartWriter {
    /// Overwrite the stored cart with `products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be encoded or the storage
    /// write fails.
    #[instrument(skip(self, products), fields(key = %self.storage_key, lines = products.len()))]
    pub async fn write(&self, products: &CartCollection) -> Result<()> {
        let raw = serde_json::to_string(products)?;
        self.storage.set(&self.storage_key, &raw).await?;
        debug!("Saved cart");
        Ok(())
    }
}
