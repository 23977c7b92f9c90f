//! Session-related types.
//!
//! The session holds only the cart reference; cart contents live in the
//! cart registry and on disk.

/// Session keys.
pub mod keys {
    /// Key for storing the visitor's cart ID.
    pub const CART_ID: &str = "cart_id";
}
