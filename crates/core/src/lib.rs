//! GoMarket Core - Shared cart types.
//!
//! This crate provides the value types used across all GoMarket components:
//! - `cart` - Cart store, storage adapters and the active-cart scope
//! - `cli` - Command-line driver for a device-local cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure transformations - no I/O, no
//! storage access, no async runtime. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, quantities, and the
//!   cart collection itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
