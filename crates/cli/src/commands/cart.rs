//! Cart editing commands.
//!
//! Every command opens the file-backed cart, applies at most one mutation and
//! waits for the save before printing, so a failed write exits non-zero.
//!
//! # Environment Variables
//!
//! - `GOMARKET_STORAGE_KEY` - Key the cart is stored under
//! - `GOMARKET_DATA_DIR` - Directory holding the stored cart

use std::sync::Arc;

use gomarket_cart::{CartConfig, CartError, CartStore, ConfigError, FileStore};
use gomarket_core::{NewCartItem, Price, ProductId};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart could not be saved.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The cart could not be rendered.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Open the cart stored in the configured data directory.
pub async fn open_store() -> Result<CartStore, CartCommandError> {
    let config = CartConfig::from_env()?;
    tracing::debug!(
        dir = %config.data_dir.display(),
        key = %config.storage_key,
        "Opening cart"
    );
    let storage = FileStore::new(config.data_dir.clone());
    Ok(CartStore::open(Arc::new(storage), &config).await)
}

/// Add one unit of a product and save.
pub async fn add(
    store: &mut CartStore,
    id: String,
    title: String,
    image_url: String,
    price: Price,
) -> Result<(), CartCommandError> {
    let product = NewCartItem {
        id: ProductId::new(id),
        title,
        image_url,
        price,
    };
    tracing::info!("Adding {} to cart", product.id);
    store.add_to_cart(product);
    store.save().await?;
    Ok(())
}

/// Add one unit to an existing line and save.
pub async fn increment(store: &mut CartStore, id: &ProductId) -> Result<(), CartCommandError> {
    warn_if_missing(store, id);
    store.increment(id);
    store.save().await?;
    Ok(())
}

/// Remove one unit from an existing line and save.
pub async fn decrement(store: &mut CartStore, id: &ProductId) -> Result<(), CartCommandError> {
    warn_if_missing(store, id);
    store.decrement(id);
    store.save().await?;
    Ok(())
}

fn warn_if_missing(store: &CartStore, id: &ProductId) {
    if !store.products().contains(id) {
        tracing::warn!("No cart line for {id}, cart unchanged");
    }
}

/// Print the cart as pretty JSON on stdout.
pub fn print(store: &CartStore) -> Result<(), CartCommandError> {
    let json = serde_json::to_string_pretty(store.products())?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
