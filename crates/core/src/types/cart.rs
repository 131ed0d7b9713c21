//! Cart line items and the ordered cart collection.
//!
//! Every transformation on [`CartCollection`] returns a new collection; the
//! receiver is never mutated. Callers swap the whole value, which keeps
//! snapshots handed to subscribers stable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::quantity::Quantity;

/// A product as offered by the catalog, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: Price,
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: Price,
    pub quantity: Quantity,
}

impl CartItem {
    /// Turn a catalog product into a cart line with a single unit.
    #[must_use]
    pub fn from_new(item: NewCartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: Quantity::ONE,
        }
    }

    fn with_quantity(&self, quantity: Quantity) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

impl From<NewCartItem> for CartItem {
    fn from(item: NewCartItem) -> Self {
        Self::from_new(item)
    }
}

/// Errors that can occur when building a [`CartCollection`] from raw items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartCollectionError {
    /// Two entries share the same product ID.
    #[error("duplicate cart item id: {0}")]
    DuplicateId(ProductId),
}

/// The ordered, id-unique list of items in a cart.
///
/// Insertion order is preserved. Adding a product that is already present
/// bumps its quantity instead of adding a second entry.
///
/// ```
/// use gomarket_core::{CartCollection, NewCartItem, Price, ProductId};
///
/// let shoe = NewCartItem {
///     id: ProductId::new("shoe"),
///     title: "Shoe".to_string(),
///     image_url: "https://cdn.example/shoe.png".to_string(),
///     price: Price::from_cents(4990).unwrap(),
/// };
///
/// let cart = CartCollection::new()
///     .with_added(shoe.clone())
///     .with_added(shoe);
///
/// assert_eq!(cart.len(), 1);
/// assert_eq!(cart.total_quantity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct CartCollection {
    items: Vec<CartItem>,
}

impl CartCollection {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line when the ID is already present,
    /// otherwise appends a new line with quantity 1.
    #[must_use]
    pub fn with_added(&self, product: NewCartItem) -> Self {
        if self.contains(&product.id) {
            return self.with_incremented(&product.id);
        }

        let mut items = self.items.clone();
        items.push(CartItem::from_new(product));
        Self { items }
    }

    /// Add one unit to the line matching `id`. Unknown IDs leave the cart unchanged.
    #[must_use]
    pub fn with_incremented(&self, id: &ProductId) -> Self {
        self.map_line(id, Quantity::incremented)
    }

    /// Remove one unit from the line matching `id`, never going below 1.
    /// Unknown IDs leave the cart unchanged.
    #[must_use]
    pub fn with_decremented(&self, id: &ProductId) -> Self {
        self.map_line(id, Quantity::decremented)
    }

    fn map_line(&self, id: &ProductId, f: impl Fn(Quantity) -> Quantity) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if &item.id == id {
                    item.with_quantity(f(item.quantity))
                } else {
                    item.clone()
                }
            })
            .collect();
        Self { items }
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether a line for `id` exists.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct lines.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of all line quantities (the cart badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

impl TryFrom<Vec<CartItem>> for CartCollection {
    type Error = CartCollectionError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(CartCollectionError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }
}

impl From<CartCollection> for Vec<CartItem> {
    fn from(collection: CartCollection) -> Self {
        collection.items
    }
}

impl<'a> IntoIterator for &'a CartCollection {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
