//! Core types for GoMarket.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart::{CartCollection, CartCollectionError, CartItem, NewCartItem};
pub use id::*;
pub use price::{Price, PriceError, PriceParseError};
pub use quantity::{Quantity, QuantityError};
