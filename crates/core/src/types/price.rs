//! Type-safe unit price using decimal arithmetic.
//!
//! Prices are stored as JSON numbers so that persisted carts stay readable by
//! any client that shares the same storage key.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount would change when stored as a JSON number.
    #[error("price cannot be stored exactly: {0}")]
    Unrepresentable(Decimal),
}

/// A non-negative unit price.
///
/// Only amounts that survive the trip through a JSON (`f64`) number are
/// accepted, so a saved cart always decodes to the same prices.
///
/// ## Examples
///
/// ```
/// use gomarket_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(1999, 2)).is_ok());
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero, or
    /// [`PriceError::Unrepresentable`] if it has more precision or magnitude
    /// than a stored JSON number keeps.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if !survives_float(amount) {
            return Err(PriceError::Unrepresentable(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The amount in the currency's standard unit (e.g., dollars, not cents).
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.trim().parse::<Decimal>()?;
        Ok(Self::new(amount)?)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

/// Whether `amount` decodes back to itself after being written as an `f64`.
fn survives_float(amount: Decimal) -> bool {
    amount
        .to_f64()
        .filter(|f| f.is_finite())
        .and_then(|f| f.to_string().parse::<Decimal>().ok())
        .is_some_and(|decoded| decoded == amount)
}

/// Errors that can occur when parsing a [`Price`] from text.
#[derive(thiserror::Error, Debug)]
pub enum PriceParseError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(#[from] rust_decimal::Error),
    /// The input is a negative number.
    #[error(transparent)]
    OutOfRange(#[from] PriceError),
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
