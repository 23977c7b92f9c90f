//! The observable, persisted cart store.

use core::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::quantity::Quantity;
use super::state::{CartLine, CartState};
use super::storage::KeyValueStore;
use crate::types::{Product, ProductId};

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "cart";

type Observer = Box<dyn Fn(&CartState) + Send + Sync>;

/// Handle returned by [`CartStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A single shared cart.
///
/// Every mutation goes through one of the four operations
/// ([`add_to_cart`](Self::add_to_cart), [`remove_from_cart`](Self::remove_from_cart),
/// [`update_quantity`](Self::update_quantity), [`clear_cart`](Self::clear_cart)).
/// A mutation that changes the cart is written to storage and then reported
/// synchronously to every observer; a mutation that changes nothing does
/// neither. Each operation returns whether the cart changed.
///
/// An emptied cart is persisted by removing its key, which restores as empty.
///
/// None of the operations fail. Quantities are normalized, and storage errors
/// are logged while the in-memory state stays authoritative.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use heirloom_core::cart::{CartStore, MemoryStore};
/// use heirloom_core::{Category, Product};
/// use rust_decimal::Decimal;
///
/// let bag = Arc::new(
///     Product::new("1", "Flap Bag", "Chanel", "", Decimal::new(100, 0), "", Category::Bags)
///         .expect("valid product"),
/// );
///
/// let mut cart = CartStore::open(MemoryStore::new());
/// cart.add_to_cart(Arc::clone(&bag), 2);
/// cart.add_to_cart(bag, 3);
///
/// assert_eq!(cart.lines().len(), 1);
/// assert_eq!(cart.cart_count(), 5);
/// assert_eq!(cart.cart_total(), Decimal::new(500, 0));
/// ```
pub struct CartStore<S> {
    state: CartState,
    storage: S,
    key: String,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart persisted in `storage` under [`CART_STORAGE_KEY`].
    ///
    /// Missing, unreadable or corrupt data yields an empty cart.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, CART_STORAGE_KEY)
    }

    /// Open the cart persisted under a custom key.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = restore(&storage, &key);
        Self {
            state,
            storage,
            key,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current cart contents.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Lines in cart order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    /// The backing storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add `quantity` of a product, merging into its existing line.
    ///
    /// The quantity is clamped to at least 1. Products with an empty ID are
    /// ignored.
    pub fn add_to_cart(&mut self, product: Arc<Product>, quantity: i64) -> bool {
        if product.id.is_empty() {
            warn!("ignoring add_to_cart for product with empty id");
            return false;
        }
        let quantity = Quantity::clamped(quantity);
        debug!(product_id = %product.id, %quantity, "add_to_cart");
        self.state.add(product, quantity);
        self.commit();
        true
    }

    /// Add a single unit of a product.
    pub fn add_one(&mut self, product: Arc<Product>) -> bool {
        self.add_to_cart(product, 1)
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        if !self.state.remove(product_id) {
            return false;
        }
        debug!(%product_id, "remove_from_cart");
        self.commit();
        true
    }

    /// Set a line's quantity. Values below 1 remove the line; absent
    /// products and unchanged quantities are left alone.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove_from_cart(product_id);
        }

        let quantity = Quantity::clamped(quantity);
        if !self.state.set_quantity(product_id, quantity) {
            return false;
        }
        debug!(%product_id, %quantity, "update_quantity");
        self.commit();
        true
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) -> bool {
        if !self.state.clear() {
            return false;
        }
        debug!("clear_cart");
        self.commit();
        true
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.state.total()
    }

    /// Total number of items (not lines).
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.state.count()
    }

    /// Register an observer, called with the new state after every change.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&CartState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn commit(&mut self) {
        self.persist();
        for (_, observer) in &self.observers {
            observer(&self.state);
        }
    }

    fn persist(&self) {
        if self.state.is_empty() {
            if let Err(e) = self.storage.remove(&self.key) {
                warn!(key = %self.key, error = %e, "failed to remove persisted cart");
            }
            return;
        }

        let blob = match serde_json::to_string(&self.state) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.key, &blob) {
            warn!(key = %self.key, error = %e, "failed to persist cart");
        }
    }
}

fn restore<S: KeyValueStore>(storage: &S, key: &str) -> CartState {
    let blob = match storage.load(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return CartState::new(),
        Err(e) => {
            warn!(%key, error = %e, "failed to read persisted cart, starting empty");
            return CartState::new();
        }
    };

    serde_json::from_str(&blob).unwrap_or_else(|e| {
        warn!(%key, error = %e, "discarding corrupt persisted cart");
        CartState::new()
    })
}

impl<S> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cart::storage::{MemoryStore, StorageError};
    use crate::types::Category;

    fn product(id: &str, price: i64) -> Arc<Product> {
        Arc::new(
            Product::new(
                id,
                format!("Item {id}"),
                "Brand",
                "",
                Decimal::new(price, 0),
                "",
                Category::Jewelry,
            )
            .unwrap(),
        )
    }

    fn store() -> CartStore<Arc<MemoryStore>> {
        CartStore::open(Arc::new(MemoryStore::new()))
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_scenarios_a_through_d() {
        let mut cart = store();
        let id = ProductId::new("1");

        cart.add_to_cart(product("1", 100), 2);
        assert_eq!(cart.cart_count(), 2);
        assert_eq!(cart.cart_total(), Decimal::new(200, 0));

        cart.add_to_cart(product("1", 100), 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.state().line(&id).unwrap().quantity.get(), 5);
        assert_eq!(cart.cart_total(), Decimal::new(500, 0));

        cart.update_quantity(&id, 1);
        assert_eq!(cart.state().line(&id).unwrap().quantity.get(), 1);
        assert_eq!(cart.cart_total(), Decimal::new(100, 0));

        cart.remove_from_cart(&id);
        assert!(cart.state().is_empty());
        assert_eq!(cart.cart_count(), 0);
        assert_eq!(cart.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn test_add_zero_quantity_clamps_to_one() {
        let mut cart = store();
        cart.add_to_cart(product("2", 50), 0);
        assert_eq!(cart.cart_count(), 1);
        assert_eq!(cart.cart_total(), Decimal::new(50, 0));

        cart.add_to_cart(product("2", 50), -4);
        assert_eq!(cart.cart_count(), 2);
    }

    #[test]
    fn test_repeated_adds_sum_clamped_quantities() {
        let mut cart = store();
        for quantity in [3, 0, -2, 1, 5] {
            cart.add_to_cart(product("9", 10), quantity);
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.cart_count(), 3 + 1 + 1 + 1 + 5);
    }

    #[test]
    fn test_update_below_one_removes() {
        for quantity in [0, -1, i64::MIN] {
            let mut cart = store();
            cart.add_to_cart(product("1", 10), 3);
            cart.add_to_cart(product("2", 10), 1);
            cart.update_quantity(&ProductId::new("1"), quantity);

            let mut expected = store();
            expected.add_to_cart(product("1", 10), 3);
            expected.add_to_cart(product("2", 10), 1);
            expected.remove_from_cart(&ProductId::new("1"));

            assert_eq!(cart.state(), expected.state());
        }
    }

    #[test]
    fn test_update_absent_product_is_noop() {
        let mut cart = store();
        cart.add_to_cart(product("1", 10), 1);
        cart.update_quantity(&ProductId::new("nope"), 4);
        assert_eq!(cart.cart_count(), 1);
    }

    #[test]
    fn test_update_huge_quantity_saturates() {
        let mut cart = store();
        cart.add_to_cart(product("1", 1), 1);
        cart.update_quantity(&ProductId::new("1"), i64::MAX);
        assert_eq!(cart.cart_count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut once = store();
        once.add_to_cart(product("1", 10), 1);
        once.add_to_cart(product("2", 10), 1);
        once.remove_from_cart(&ProductId::new("1"));

        let mut twice = store();
        twice.add_to_cart(product("1", 10), 1);
        twice.add_to_cart(product("2", 10), 1);
        twice.remove_from_cart(&ProductId::new("1"));
        twice.remove_from_cart(&ProductId::new("1"));

        assert_eq!(once.state(), twice.state());
    }

    #[test]
    fn test_empty_product_id_is_ignored() {
        let mut cart = store();
        let mut blank = (*product("1", 10)).clone();
        blank.id = ProductId::new("");
        cart.add_to_cart(Arc::new(blank), 1);
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_clear_cart() {
        let mut cart = store();
        cart.add_to_cart(product("1", 10), 1);
        cart.add_to_cart(product("2", 20), 2);
        cart.clear_cart();
        assert!(cart.state().is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::open(Arc::clone(&storage));
        cart.add_to_cart(product("1", 100), 2);
        cart.add_to_cart(product("2", 50), 1);
        cart.update_quantity(&ProductId::new("1"), 4);

        let reopened = CartStore::open(Arc::clone(&storage));
        assert_eq!(reopened.state(), cart.state());
        assert_eq!(reopened.cart_total(), Decimal::new(450, 0));

        cart.clear_cart();
        let reopened = CartStore::open(storage);
        assert!(reopened.state().is_empty());
    }

    #[test]
    fn test_custom_key_is_used() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::open_with_key(Arc::clone(&storage), "guest-cart");
        cart.add_one(product("1", 1));
        assert!(storage.load("guest-cart").unwrap().is_some());
        assert!(storage.load(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_blob_starts_empty() {
        let storage = MemoryStore::with_entry(CART_STORAGE_KEY, "\u{0}garbage{[");
        let cart = CartStore::open(storage);
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_invalid_line_makes_blob_corrupt() {
        let blob = r#"[{"product":{"id":"1","name":"a","brand":"b","description":"","price":"10","image":"","category":"bags"},"quantity":-3}]"#;
        let cart = CartStore::open(MemoryStore::with_entry(CART_STORAGE_KEY, blob));
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_invalid_product_makes_blob_corrupt() {
        let empty_id = r#"[{"product":{"id":"","name":"a","brand":"b","description":"","price":"10","image":"","category":"bags"},"quantity":2}]"#;
        let cart = CartStore::open(MemoryStore::with_entry(CART_STORAGE_KEY, empty_id));
        assert!(cart.state().is_empty());

        let negative = r#"[{"product":{"id":"1","name":"a","brand":"b","description":"","price":"-500","image":"","category":"bags"},"quantity":2}]"#;
        let cart = CartStore::open(MemoryStore::with_entry(CART_STORAGE_KEY, negative));
        assert!(cart.state().is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_report_changes() {
        let mut cart = store();
        let id = ProductId::new("1");

        assert!(cart.add_to_cart(product("1", 10), 1));
        assert!(!cart.update_quantity(&id, 1));
        assert!(cart.update_quantity(&id, 3));
        assert!(!cart.remove_from_cart(&ProductId::new("999")));
        assert!(cart.remove_from_cart(&id));
        assert!(!cart.update_quantity(&id, 0));
        assert!(!cart.clear_cart());
    }

    #[test]
    fn test_emptied_cart_removes_key() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::open(Arc::clone(&storage));
        cart.add_to_cart(product("1", 10), 1);
        assert!(storage.load(CART_STORAGE_KEY).unwrap().is_some());

        cart.remove_from_cart(&ProductId::new("1"));
        assert!(storage.load(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_failing_storage_keeps_memory_state() {
        let mut cart = CartStore::open(FailingStore);
        assert!(cart.state().is_empty());
        cart.add_to_cart(product("1", 25), 2);
        assert_eq!(cart.cart_total(), Decimal::new(50, 0));
    }

    #[test]
    fn test_observers_see_every_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut cart = store();
        let sink = Arc::clone(&seen);
        cart.subscribe(move |state| sink.lock().unwrap().push(state.count()));

        cart.add_to_cart(product("1", 10), 2);
        cart.update_quantity(&ProductId::new("1"), 5);
        cart.remove_from_cart(&ProductId::new("1"));

        assert_eq!(*seen.lock().unwrap(), [2, 5, 0]);
    }

    #[test]
    fn test_observers_not_notified_on_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cart = store();
        let counter = Arc::clone(&calls);
        cart.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cart.remove_from_cart(&ProductId::new("missing"));
        cart.update_quantity(&ProductId::new("missing"), 3);
        cart.clear_cart();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        cart.add_to_cart(product("1", 10), 2);
        cart.update_quantity(&ProductId::new("1"), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_observer_runs_after_persist() {
        let storage = Arc::new(MemoryStore::new());
        let mut cart = CartStore::open(Arc::clone(&storage));
        let persisted = Arc::new(Mutex::new(None));

        let reader = Arc::clone(&storage);
        let sink = Arc::clone(&persisted);
        cart.subscribe(move |_| {
            *sink.lock().unwrap() = reader.load(CART_STORAGE_KEY).unwrap();
        });
        cart.add_to_cart(product("1", 10), 1);

        assert!(persisted.lock().unwrap().as_deref().unwrap().contains("\"id\":\"1\""));
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cart = store();
        let counter = Arc::clone(&calls);
        let id = cart.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cart.add_to_cart(product("1", 10), 1);
        assert!(cart.unsubscribe(id));
        assert!(!cart.unsubscribe(id));
        cart.add_to_cart(product("1", 10), 1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
