//! Task-local active cart.
//!
//! UI code deep in a component tree can reach the cart without threading a
//! handle through every call: wrap the tree in [`provide_cart`] and call
//! [`use_cart`] inside it. Reaching for the cart outside a provided scope is a
//! programming error.

use std::future::Future;

use crate::error::{CartError, Result};
use crate::handle::CartHandle;

tokio::task_local! {
    static ACTIVE_CART: CartHandle;
}

/// Run `future` with `handle` as the active cart.
pub async fn provide_cart<F: Future>(handle: CartHandle, future: F) -> F::Output {
    ACTIVE_CART.scope(handle, future).await
}

/// The active cart, or [`CartError::NoActiveCart`] outside [`provide_cart`].
///
/// # Errors
///
/// Returns [`CartError::NoActiveCart`] when no cart is provided for the
/// current task.
pub fn try_use_cart() -> Result<CartHandle> {
    ACTIVE_CART
        .try_with(CartHandle::clone)
        .map_err(|_| CartError::NoActiveCart)
}

/// The active cart.
///
/// # Panics
///
/// Panics when called outside [`provide_cart`].
#[must_use]
pub fn use_cart() -> CartHandle {
    match try_use_cart() {
        Ok(handle) => handle,
        Err(e) => panic!("{e}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use gomarket_core::{NewCartItem, Price, ProductId};

    use super::*;
    use crate::config::CartConfig;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_use_cart_inside_scope() {
        let handle = CartHandle::open(Arc::new(MemoryStore::new()), &CartConfig::default()).await;

        provide_cart(handle.clone(), async {
            use_cart()
                .add_to_cart(NewCartItem {
                    id: ProductId::new("a"),
                    title: "A".to_string(),
                    image_url: "img".to_string(),
                    price: Price::ZERO,
                })
                .await;
        })
        .await;

        assert_eq!(handle.products().len(), 1);
    }

    #[test]
    fn test_try_use_cart_outside_scope() {
        assert!(matches!(try_use_cart(), Err(CartError::NoActiveCart)));
    }

    #[test]
    #[should_panic(expected = "use_cart must be called within provide_cart")]
    fn test_use_cart_outside_scope_panics() {
        let _ = use_cart();
    }

    #[tokio::test]
    async fn test_scope_ends_with_future() {
        let handle = CartHandle::open(Arc::new(MemoryStore::new()), &CartConfig::default()).await;
        provide_cart(handle, async {
            assert!(try_use_cart().is_ok());
        })
        .await;
        assert!(try_use_cart().is_err());
    }
}
