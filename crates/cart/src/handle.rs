//! Shared cart handle for UI code.
//!
//! A [`CartHandle`] wraps a [`CartStore`] so many components can read and
//! mutate the same cart. Every change notifies subscribers and persists in
//! the background; failed background writes are logged and dropped.
//!
//! Mutations never wait on storage. Each change takes a numbered snapshot
//! under the store lock, and writes happen one at a time behind a separate
//! writer lock that skips snapshots older than the last one written.

use std::sync::Arc;

use gomarket_core::{CartCollection, NewCartItem, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::config::CartConfig;
use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::store::{CartStore, CartWriter};

/// Cheaply cloneable handle to a shared cart.
#[derive(Clone)]
pub struct CartHandle {
    inner: Arc<CartHandleInner>,
}

struct CartHandleInner {
    state: Mutex<HandleState>,
    changes: watch::Sender<CartCollection>,
    writer: CartWriter,
    /// Version of the newest snapshot a write was attempted for.
    written: Mutex<u64>,
}

struct HandleState {
    store: CartStore,
    version: u64,
}

/// A numbered copy of the cart taken right after a change.
struct Snapshot {
    version: u64,
    products: CartCollection,
}

impl std::fmt::Debug for CartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartHandle")
            .field("products", &*self.inner.changes.borrow())
            .finish_non_exhaustive()
    }
}

impl CartHandle {
    /// Open the cart stored in `storage` and wrap it in a handle.
    pub async fn open(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        Self::from_store(CartStore::open(storage, config).await)
    }

    /// Wrap an already initialised store.
    #[must_use]
    pub fn from_store(store: CartStore) -> Self {
        let (changes, _) = watch::channel(store.products().clone());
        let writer = store.writer();
        Self {
            inner: Arc::new(CartHandleInner {
                state: Mutex::new(HandleState { store, version: 0 }),
                changes,
                writer,
                written: Mutex::new(0),
            }),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn products(&self) -> CartCollection {
        self.inner.changes.borrow().clone()
    }

    /// Receive the cart every time it changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartCollection> {
        self.inner.changes.subscribe()
    }

    /// Add one unit of `product`, then persist in the background.
    pub async fn add_to_cart(&self, product: NewCartItem) {
        self.mutate(|store| {
            store.add_to_cart(product);
        })
        .await;
    }

    /// Add one unit to the line for `id`, then persist in the background.
    pub async fn increment(&self, id: &ProductId) {
        self.mutate(|store| {
            store.increment(id);
        })
        .await;
    }

    /// Remove one unit from the line for `id`, then persist in the background.
    pub async fn decrement(&self, id: &ProductId) {
        self.mutate(|store| {
            store.decrement(id);
        })
        .await;
    }

    /// Persist the current cart and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub async fn save(&self) -> Result<()> {
        let snapshot = {
            let state = self.inner.state.lock().await;
            Snapshot {
                version: state.version,
                products: state.store.products().clone(),
            }
        };
        self.inner.write(snapshot).await
    }

    async fn mutate(&self, f: impl FnOnce(&mut CartStore)) {
        let snapshot = {
            let mut state = self.inner.state.lock().await;
            f(&mut state.store);
            let products = state.store.products().clone();
            let changed = self.inner.changes.send_if_modified(|current| {
                if *current == products {
                    false
                } else {
                    current.clone_from(&products);
                    true
                }
            });
            if !changed {
                return;
            }
            state.version += 1;
            Snapshot {
                version: state.version,
                products,
            }
        };
        self.persist_in_background(snapshot);
    }

    /// Spawn a best-effort write of `snapshot`.
    fn persist_in_background(&self, snapshot: Snapshot) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let version = snapshot.version;
            match inner.write(snapshot).await {
                Ok(()) => debug!(version, "Background cart save complete"),
                Err(e) => warn!(version, error = %e, "Background cart save failed"),
            }
        });
    }
}

impl CartHandleInner {
    /// Write `snapshot` unless a newer one has already been written.
    async fn write(&self, snapshot: Snapshot) -> Result<()> {
        let mut written = self.written.lock().await;
        if snapshot.version < *written {
            debug!(
                version = snapshot.version,
                written = *written,
                "Skipping stale cart snapshot"
            );
            return Ok(());
        }
        *written = snapshot.version;
        self.writer.write(&snapshot.products).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use gomarket_core::Price;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }
    }

    /// Memory storage whose writes take `delay` and are counted.
    #[derive(Default)]
    struct RecordingStore {
        entries: MemoryStore,
        delay: Duration,
        writes: AtomicUsize,
    }

    impl RecordingStore {
        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeyValueStore for RecordingStore {
        async fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.entries.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            tokio::time::sleep(self.delay).await;
            self.entries.set(key, value).await?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn product(id: &str) -> NewCartItem {
        NewCartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://cdn.example/{id}.png"),
            price: Price::from_cents(500).unwrap(),
        }
    }

    async fn saved(storage: &MemoryStore) -> Option<CartCollection> {
        let raw = storage.get("@GoMarketPlace").await.unwrap()?;
        Some(serde_json::from_str(&raw).unwrap())
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let handle = CartHandle::open(Arc::new(MemoryStore::new()), &CartConfig::default()).await;
        let mut rx = handle.subscribe();

        handle.add_to_cart(product("a")).await;

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[tokio::test]
    async fn test_noop_does_not_notify() {
        let handle = CartHandle::open(Arc::new(MemoryStore::new()), &CartConfig::default()).await;
        handle.add_to_cart(product("a")).await;
        let rx = handle.subscribe();

        handle.increment(&ProductId::new("missing")).await;

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = CartHandle::open(Arc::new(MemoryStore::new()), &CartConfig::default()).await;
        let other = handle.clone();

        handle.add_to_cart(product("a")).await;
        other.increment(&ProductId::new("a")).await;

        let products = handle.products();
        assert_eq!(products.get(&ProductId::new("a")).unwrap().quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_background_save_writes_latest_state() {
        let storage = MemoryStore::new();
        let handle = CartHandle::open(Arc::new(storage.clone()), &CartConfig::default()).await;

        handle.add_to_cart(product("a")).await;
        handle.add_to_cart(product("b")).await;
        handle.increment(&ProductId::new("a")).await;

        let expected = handle.products();
        tokio::time::timeout(Duration::from_secs(5), async {
            while saved(&storage).await.as_ref() != Some(&expected) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_background_save_failure_is_swallowed() {
        let handle = CartHandle::open(Arc::new(ReadOnlyStore), &CartConfig::default()).await;

        handle.add_to_cart(product("a")).await;
        handle.decrement(&ProductId::new("a")).await;

        assert_eq!(handle.products().len(), 1);
        assert!(handle.save().await.is_err());
    }

    #[tokio::test]
    async fn test_mutation_does_not_wait_for_slow_storage() {
        let storage = Arc::new(RecordingStore::slow(Duration::from_millis(500)));
        let handle = CartHandle::open(storage.clone(), &CartConfig::default()).await;

        handle.add_to_cart(product("a")).await;
        // Let the background write start and hold the writer.
        tokio::task::yield_now().await;

        let started = tokio::time::Instant::now();
        handle.increment(&ProductId::new("a")).await;
        handle.add_to_cart(product("b")).await;
        assert!(
            started.elapsed() < Duration::from_millis(100),
            "mutations took {:?}",
            started.elapsed()
        );

        let expected = handle.products();
        tokio::time::timeout(Duration::from_secs(5), async {
            while saved(&storage.entries).await.as_ref() != Some(&expected) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_unchanged_cart_is_not_rewritten() {
        let storage = Arc::new(RecordingStore::default());
        let handle = CartHandle::open(storage.clone(), &CartConfig::default()).await;

        handle.add_to_cart(product("a")).await;
        tokio::time::timeout(Duration::from_secs(5), async {
            while storage.writes() < 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        handle.increment(&ProductId::new("missing")).await;
        handle.decrement(&ProductId::new("a")).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(storage.writes(), 1);
    }
}
