//! Cart error handling.
//!
//! Storage failures surface here only from explicit saves; background writes
//! and startup loads log and recover instead.

use thiserror::Error;

use crate::storage::StorageError;

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Key-value storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cart was requested outside of `provide_cart`.
    #[error("use_cart must be called within provide_cart")]
    NoActiveCart,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
