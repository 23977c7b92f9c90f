//! Per-session cart registry.
//!
//! Open carts are kept in a `moka` cache keyed by [`CartId`] and dropped
//! after a period of inactivity. Every mutation is persisted immediately, so
//! an evicted cart is simply reopened from disk on its next use. Restoring
//! reads the file on tokio's blocking pool.
//!
//! Eviction does not know whether a request still holds a [`SharedCart`].
//! If a cart is evicted mid-request (capacity pressure, or a request running
//! longer than the idle timeout) the next open builds a second store for the
//! same file, and the two overwrite each other until the old handle drops.
//! [`MAX_OPEN_CARTS`] is sized so this only happens under overload.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use heirloom_core::CartId;
use heirloom_core::cart::{CartState, CartStore, StorageError};
use moka::future::Cache;
use tracing::info;

use crate::error::add_breadcrumb;
use crate::storage::FileStore;

/// Upper bound on carts held in memory at once.
const MAX_OPEN_CARTS: u64 = 10_000;

/// One cart shared by every request in its session.
#[derive(Clone)]
pub struct SharedCart {
    id: CartId,
    store: Arc<Mutex<CartStore<FileStore>>>,
}

impl SharedCart {
    /// Wrap an opened store.
    #[must_use]
    pub fn new(id: CartId, store: CartStore<FileStore>) -> Self {
        Self {
            id,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// The cart's ID.
    #[must_use]
    pub const fn id(&self) -> &CartId {
        &self.id
    }

    /// Run `f` with exclusive access to the store.
    ///
    /// The lock is released before this returns, so it is never held across
    /// an `.await`.
    pub fn with<R>(&self, f: impl FnOnce(&mut CartStore<FileStore>) -> R) -> R {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// A copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.with(|store| store.state().clone())
    }
}

impl std::fmt::Debug for SharedCart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCart").field("id", &self.id).finish()
    }
}

/// Registry of open carts, cheaply cloneable.
#[derive(Clone)]
pub struct CartRegistry {
    inner: Arc<CartRegistryInner>,
}

struct CartRegistryInner {
    data_dir: PathBuf,
    carts: Cache<CartId, SharedCart>,
}

impl CartRegistry {
    /// Create a registry persisting under `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, idle_timeout: Duration) -> Self {
        let carts = Cache::builder()
            .max_capacity(MAX_OPEN_CARTS)
            .time_to_idle(idle_timeout)
            .build();

        Self {
            inner: Arc::new(CartRegistryInner {
                data_dir: data_dir.into(),
                carts,
            }),
        }
    }

    /// Allocate an ID for a new cart.
    #[must_use]
    pub fn new_cart_id() -> CartId {
        CartId::new(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Get the open cart for `id`, restoring it from disk if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` cannot name a cart directory.
    pub async fn open(&self, id: &CartId) -> Result<SharedCart, StorageError> {
        let storage = FileStore::for_cart(&self.inner.data_dir, id)?;
        let cart_id = id.clone();
        self.inner
            .carts
            .try_get_with(id.clone(), async move {
                tokio::task::spawn_blocking(move || open_cart(cart_id, storage))
                    .await
                    .map_err(|e| StorageError::Unavailable(format!("cart restore failed: {e}")))
            })
            .await
            .map_err(|e: Arc<StorageError>| StorageError::Unavailable(e.to_string()))
    }
}

fn open_cart(id: CartId, storage: FileStore) -> SharedCart {
    let mut store = CartStore::open(storage);
    info!(cart_id = %id, items = store.cart_count(), "cart opened");

    let observed_id = id.clone();
    store.subscribe(move |state| {
        info!(
            cart_id = %observed_id,
            items = state.count(),
            lines = state.line_count(),
            subtotal = %state.total(),
            "cart updated"
        );
        let items = state.count().to_string();
        add_breadcrumb(
            "cart",
            "Cart updated",
            Some(&[("cart_id", observed_id.as_str()), ("items", items.as_str())]),
        );
    });

    SharedCart::new(id, store)
}
