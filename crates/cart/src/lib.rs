//! GoMarket Cart - device-local shopping cart state.
//!
//! Holds the ordered list of cart lines in memory, persists it under a single
//! key in a [`KeyValueStore`], and hands it to UI code either as an explicit
//! [`CartHandle`] or through the active-cart scope ([`provide_cart`] /
//! [`use_cart`]).
//!
//! # Modules
//!
//! - [`config`] - Storage key and data directory, loaded from the environment
//! - [`storage`] - Key-value storage port with memory and file adapters
//! - [`store`] - [`CartStore`], the single-owner cart state
//! - [`handle`] - [`CartHandle`], the shared handle with change notifications
//! - [`scope`] - Task-local active cart
//! - [`error`] - Error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod handle;
pub mod scope;
pub mod storage;
pub mod store;

pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Result};
pub use handle::CartHandle;
pub use scope::{provide_cart, try_use_cart, use_cart};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, CartWriter};

pub use gomarket_core::{CartCollection, CartItem, NewCartItem, Price, ProductId, Quantity};
