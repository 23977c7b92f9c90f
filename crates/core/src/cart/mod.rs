//! Client cart state.
//!
//! A cart is an ordered list of [`CartLine`]s, at most one per product,
//! wrapped by a [`CartStore`] that persists every change through a
//! [`KeyValueStore`] and notifies subscribers.
//!
//! # Modules
//!
//! - [`quantity`] - Positive line quantities and input normalization
//! - [`state`] - Lines, ordering and derived totals
//! - [`storage`] - The persistence trait and an in-memory store
//! - [`store`] - The observable store and its four mutating operations

pub mod quantity;
pub mod state;
pub mod storage;
pub mod store;

pub use quantity::{Quantity, floor_quantity};
pub use state::{CartLine, CartState};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use store::{CART_STORAGE_KEY, CartStore, SubscriptionId};
